use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, Timelike, Utc};

use crate::error::{Error, Result};
use crate::grouping::{compare_tasks, MAX_WINDOW_DAYS};
use crate::lists::owned_list;
use crate::models::{new_id, Database, Subtask, Task};
use crate::permissions::{can_edit_task, can_view_space};
use crate::spaces::{find_member, visible_space};

/// Where a new task goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskTarget {
    /// Unscheduled, shown in My Day.
    MyDay,
    /// One of the user's personal lists.
    List(String),
    /// A share space the user belongs to.
    Space(String),
}

/// Which tasks of a share space to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceFilter {
    All,
    /// Only tasks whose owner is the requesting user.
    Mine,
}

/// Changes applied by [`update_task`]; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub name: Option<String>,
    pub completed: Option<bool>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub notes: Option<String>,
    /// Member to hand the task over to.
    pub assignee: Option<String>,
}

/// Parses `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| Error::InvalidDate(s.to_string()))
}

/// Parses `HH:MM`, also accepting `HH:MM:SS`.
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| Error::InvalidTime(s.to_string()))
}

fn check_name(name: &str, kind: &'static str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::EmptyName(kind));
    }
    Ok(name.to_string())
}

fn can_edit(db: &Database, user_id: &str, task: &Task) -> bool {
    match db.space_of(task) {
        Some(space) => can_edit_task(user_id, task, space.role_of(user_id)),
        None => task.user_id == user_id,
    }
}

/// Refuses unless `user_id` may edit the task at `index`.
fn ensure_can_edit(db: &Database, user_id: &str, index: usize) -> Result<()> {
    let task = &db.tasks[index];
    if !can_edit(db, user_id, task) {
        tracing::warn!(task = %task.id, user = %user_id, "edit denied");
        return Err(Error::PermissionDenied(
            "You do not have permission to edit this task.".to_string(),
        ));
    }
    Ok(())
}

/// Whether the user can see the task at all.
fn can_see(db: &Database, user_id: &str, task: &Task) -> bool {
    task.user_id == user_id
        || db.space_of(task).is_some_and(|space| can_view_space(user_id, space))
}

/// Creates a task dated now, owned by `user_id`.
pub fn add_task(
    db: &mut Database,
    user_id: &str,
    name: &str,
    target: TaskTarget,
    now: DateTime<Local>,
) -> Result<Task> {
    let name = check_name(name, "Task")?;
    let list_id = match target {
        TaskTarget::MyDay => None,
        TaskTarget::List(key) => Some(owned_list(db, user_id, &key)?.id.clone()),
        TaskTarget::Space(key) => Some(visible_space(db, user_id, &key)?.id.clone()),
    };

    let naive = now.naive_local();
    let time = NaiveTime::from_hms_opt(naive.hour(), naive.minute(), 0).unwrap_or(naive.time());
    let task = Task {
        id: new_id(),
        name,
        completed: false,
        list_id,
        date: naive.date(),
        time,
        deadline: naive.date().and_time(time),
        notes: String::new(),
        last_updated: now.with_timezone(&Utc),
        user_id: user_id.to_string(),
    };
    db.tasks.push(task.clone());
    tracing::info!(task = %task.id, list = ?task.list_id, "task added");
    Ok(task)
}

pub fn set_completed(
    db: &mut Database,
    user_id: &str,
    key: &str,
    completed: bool,
    now: DateTime<Local>,
) -> Result<()> {
    let i = db.task_index(key)?;
    ensure_can_edit(db, user_id, i)?;
    let task = &mut db.tasks[i];
    task.completed = completed;
    task.last_updated = now.with_timezone(&Utc);
    tracing::info!(task = %task.id, completed, "task status updated");
    Ok(())
}

/// Shared tasks can be handed to any member of their space.
fn resolve_assignee(db: &Database, task: &Task, member: &str) -> Result<String> {
    let space = db.space_of(task).ok_or_else(|| {
        Error::PermissionDenied("Personal tasks cannot be reassigned.".to_string())
    })?;
    find_member(db, space, member)
}

/// Applies `update` to a task and stamps it. The deadline is recomputed from
/// the resulting date and time.
pub fn update_task(
    db: &mut Database,
    user_id: &str,
    key: &str,
    update: TaskUpdate,
    now: DateTime<Local>,
) -> Result<Task> {
    let i = db.task_index(key)?;
    ensure_can_edit(db, user_id, i)?;

    let name = update.name.as_deref().map(|n| check_name(n, "Task")).transpose()?;
    let assignee = match update.assignee.as_deref() {
        Some(member) => Some(resolve_assignee(db, &db.tasks[i], member)?),
        None => None,
    };

    let task = &mut db.tasks[i];
    if let Some(n) = name { task.name = n; }
    if let Some(c) = update.completed { task.completed = c; }
    if let Some(d) = update.date { task.date = d; }
    if let Some(t) = update.time { task.time = t; }
    if let Some(n) = update.notes { task.notes = n; }
    if let Some(a) = assignee { task.user_id = a; }
    task.deadline = task.date.and_time(task.time);
    task.last_updated = now.with_timezone(&Utc);
    tracing::info!(task = %task.id, "task updated");
    Ok(task.clone())
}

/// Deletes a task and its subtasks.
pub fn delete_task(db: &mut Database, user_id: &str, key: &str) -> Result<Task> {
    let i = db.task_index(key)?;
    ensure_can_edit(db, user_id, i)?;
    let task = db.tasks.remove(i);
    db.subtasks.retain(|s| s.task_id != task.id);
    tracing::info!(task = %task.id, "task deleted");
    Ok(task)
}

pub fn add_subtask(db: &mut Database, user_id: &str, task_key: &str, name: &str) -> Result<Subtask> {
    let name = check_name(name, "Subtask")?;
    let i = db.task_index(task_key)?;
    ensure_can_edit(db, user_id, i)?;
    let subtask = Subtask {
        id: new_id(),
        task_id: db.tasks[i].id.clone(),
        name,
        completed: false,
    };
    db.subtasks.push(subtask.clone());
    Ok(subtask)
}

fn editable_subtask_index(db: &Database, user_id: &str, key: &str) -> Result<usize> {
    let s = db.subtask_index(key)?;
    let t = db.task_index(&db.subtasks[s].task_id)?;
    ensure_can_edit(db, user_id, t)?;
    Ok(s)
}

pub fn set_subtask_completed(db: &mut Database, user_id: &str, key: &str, completed: bool) -> Result<()> {
    let s = editable_subtask_index(db, user_id, key)?;
    db.subtasks[s].completed = completed;
    Ok(())
}

pub fn delete_subtask(db: &mut Database, user_id: &str, key: &str) -> Result<Subtask> {
    let s = editable_subtask_index(db, user_id, key)?;
    Ok(db.subtasks.remove(s))
}

pub fn subtasks_of<'a>(db: &'a Database, task_id: &str) -> Vec<&'a Subtask> {
    db.subtasks.iter().filter(|s| s.task_id == task_id).collect()
}

/// A task the user can see, with edit rights resolved.
pub fn visible_task<'a>(db: &'a Database, user_id: &str, key: &str) -> Result<(&'a Task, bool)> {
    let i = db.task_index(key)?;
    let task = &db.tasks[i];
    if !can_see(db, user_id, task) {
        return Err(Error::NotFound { kind: "Task", id: key.to_string() });
    }
    Ok((task, can_edit(db, user_id, task)))
}

fn sorted(mut tasks: Vec<&Task>) -> Vec<&Task> {
    tasks.sort_by(|a, b| compare_tasks(a, b));
    tasks
}

/// The user's tasks scheduled for `today`.
pub fn my_day<'a>(db: &'a Database, user_id: &str, today: NaiveDate) -> Vec<&'a Task> {
    sorted(
        db.tasks
            .iter()
            .filter(|t| t.user_id == user_id && t.date == today)
            .collect(),
    )
}

/// The user's tasks dated within `window_days` days from `today`, capped at
/// [`MAX_WINDOW_DAYS`].
pub fn upcoming<'a>(db: &'a Database, user_id: &str, today: NaiveDate, window_days: i64) -> Vec<&'a Task> {
    let span = Duration::days(window_days.clamp(1, MAX_WINDOW_DAYS) - 1);
    let end = today.checked_add_signed(span).unwrap_or(NaiveDate::MAX);
    sorted(
        db.tasks
            .iter()
            .filter(|t| t.user_id == user_id && t.date >= today && t.date <= end)
            .collect(),
    )
}

/// Every task owned by or assigned to the user.
pub fn owned_tasks<'a>(db: &'a Database, user_id: &str) -> Vec<&'a Task> {
    db.tasks.iter().filter(|t| t.user_id == user_id).collect()
}

pub fn list_tasks<'a>(db: &'a Database, user_id: &str, list_key: &str) -> Result<Vec<&'a Task>> {
    let list = owned_list(db, user_id, list_key)?;
    Ok(sorted(
        db.tasks
            .iter()
            .filter(|t| t.list_id.as_deref() == Some(list.id.as_str()))
            .collect(),
    ))
}

pub fn space_tasks<'a>(
    db: &'a Database,
    user_id: &str,
    space_key: &str,
    filter: SpaceFilter,
) -> Result<Vec<&'a Task>> {
    let space = visible_space(db, user_id, space_key)?;
    Ok(sorted(
        db.tasks
            .iter()
            .filter(|t| t.list_id.as_deref() == Some(space.id.as_str()))
            .filter(|t| filter == SpaceFilter::All || t.user_id == user_id)
            .collect(),
    ))
}

/// Case-insensitive search over names and notes of every task the user can see.
pub fn search<'a>(db: &'a Database, user_id: &str, query: &str) -> Vec<&'a Task> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    sorted(
        db.tasks
            .iter()
            .filter(|t| can_see(db, user_id, t))
            .filter(|t| {
                t.name.to_lowercase().contains(&needle) || t.notes.to_lowercase().contains(&needle)
            })
            .collect(),
    )
}
