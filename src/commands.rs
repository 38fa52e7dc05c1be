use std::io::{self, Write};

use chrono::Local;
use clap_complete::Shell;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::auth;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::grouping::{agenda, group_by_letter, group_by_weekday, TaskGroup};
use crate::lists;
use crate::models::{Database, Role, Session, Task};
use crate::spaces;
use crate::storage::Store;
use crate::tasks::{self, SpaceFilter, TaskTarget, TaskUpdate};

/// Number of id characters shown in tables. Any unique prefix is accepted back.
const SHORT_ID: usize = 8;

/// First `SHORT_ID` characters of an id.
pub fn short(id: &str) -> &str {
    id.char_indices().nth(SHORT_ID).map_or(id, |(i, _)| &id[..i])
}

/// What every command needs: where the data lives and how it is configured.
pub struct App {
    pub store: Store,
    pub config: Config,
}

impl App {
    pub fn new(store: Store, config: Config) -> Self {
        App { store, config }
    }

    /// The signed-in user, checked against the user records.
    fn session(&self, db: &Database) -> Result<Session> {
        let session = self.store.load_session()?.ok_or(Error::NotSignedIn)?;
        if db.users.iter().all(|u| u.id != session.user_id) {
            return Err(Error::NotSignedIn);
        }
        Ok(session)
    }

    /// Runs a read-only operation for the signed-in user.
    fn read<T>(&self, f: impl FnOnce(&Database, &Session) -> Result<T>) -> Result<T> {
        let db = self.store.load()?;
        let session = self.session(&db)?;
        f(&db, &session)
    }

    /// Runs a mutation for the signed-in user and saves on success.
    fn write<T>(&self, f: impl FnOnce(&mut Database, &Session) -> Result<T>) -> Result<T> {
        let mut db = self.store.load()?;
        let session = self.session(&db)?;
        let out = f(&mut db, &session)?;
        self.store.save(&db)?;
        Ok(out)
    }
}

fn header(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|n| Cell::new(n).add_attribute(Attribute::Bold))
        .collect()
}

/// Human name of the list or space a task lives in.
fn location(db: &Database, task: &Task) -> String {
    match task.list_id.as_deref() {
        None => "My Day".to_string(),
        Some(id) => {
            if let Some(l) = db.lists.iter().find(|l| l.id == id) {
                l.name.clone()
            } else if let Some(s) = db.share_spaces.iter().find(|s| s.id == id) {
                format!("{} (shared)", s.name)
            } else {
                "-".to_string()
            }
        }
    }
}

fn task_table(db: &Database, tasks: &[&Task]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(&["ID", "Name", "Date", "Time", "Owner", "List", "Status"]));

    let today = Local::now().date_naive();
    for t in tasks {
        let status = if t.completed { "Done" } else { "Pending" };
        let status_color = if t.completed { Color::Green } else { Color::Yellow };
        let date_color = if !t.completed && t.date < today { Color::Red } else { Color::Reset };
        table.add_row(vec![
            Cell::new(short(&t.id)),
            Cell::new(&t.name),
            Cell::new(t.date).fg(date_color),
            Cell::new(t.time.format("%H:%M")),
            Cell::new(spaces::email_for(db, &t.user_id)),
            Cell::new(location(db, t)),
            Cell::new(status).fg(status_color),
        ]);
    }
    table
}

fn print_tasks(db: &Database, tasks: &[&Task]) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }
    println!("{}", task_table(db, tasks));
}

fn print_groups(db: &Database, groups: &[TaskGroup<'_>]) {
    for group in groups {
        println!("{}", group.label);
        print_tasks(db, &group.tasks);
    }
}

/// Creates an account and signs it in.
pub fn cmd_register(app: &App, email: &str, password: &str, confirm: &str) -> Result<()> {
    let mut db = app.store.load()?;
    let user = auth::register(&mut db, email, password, confirm, app.config.min_password_length)?;
    app.store.save(&db)?;
    let session = Session { user_id: user.id, email: user.email };
    app.store.save_session(&session)?;
    println!("Registered and signed in as {}.", session.email);
    Ok(())
}

pub fn cmd_login(app: &App, email: &str, password: &str) -> Result<()> {
    let db = app.store.load()?;
    let session = auth::sign_in(&db, email, password)?;
    app.store.save_session(&session)?;
    println!("Signed in as {}.", session.email);
    Ok(())
}

pub fn cmd_logout(app: &App) -> Result<()> {
    app.store.clear_session()?;
    println!("Signed out.");
    Ok(())
}

pub fn cmd_whoami(app: &App) -> Result<()> {
    app.read(|_, session| {
        println!("{} ({})", session.email, short(&session.user_id));
        Ok(())
    })
}

pub fn cmd_passwd(app: &App, password: &str, confirm: &str) -> Result<()> {
    app.write(|db, session| {
        auth::change_password(db, &session.user_id, password, confirm, app.config.min_password_length)
    })?;
    println!("Password changed.");
    Ok(())
}

pub fn cmd_list_add(app: &App, name: &str) -> Result<()> {
    let list = app.write(|db, session| lists::create_list(db, &session.user_id, name))?;
    println!("List '{}' added (id = {}).", list.name, short(&list.id));
    Ok(())
}

/// Shows the user's personal lists and the share spaces they belong to.
pub fn cmd_list_ls(app: &App) -> Result<()> {
    app.read(|db, session| {
        let own = lists::lists_for_user(db, &session.user_id);
        let shared = spaces::spaces_for_user(db, &session.user_id);
        if own.is_empty() && shared.is_empty() {
            println!("No lists found.");
            return Ok(());
        }
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_header(header(&["ID", "Name", "Kind", "Tasks"]));
        let count = |id: &str| db.tasks.iter().filter(|t| t.list_id.as_deref() == Some(id)).count();
        for l in own {
            table.add_row(vec![
                Cell::new(short(&l.id)),
                Cell::new(&l.name),
                Cell::new("list"),
                Cell::new(count(&l.id)),
            ]);
        }
        for s in shared {
            let role = s.role_of(&session.user_id).map(|r| r.to_string()).unwrap_or_default();
            table.add_row(vec![
                Cell::new(short(&s.id)),
                Cell::new(&s.name),
                Cell::new(format!("shared, {role}")),
                Cell::new(count(&s.id)),
            ]);
        }
        println!("{table}");
        Ok(())
    })
}

pub fn cmd_list_show(app: &App, list: &str) -> Result<()> {
    app.read(|db, session| {
        let name = lists::owned_list(db, &session.user_id, list)?.name.clone();
        let tasks = tasks::list_tasks(db, &session.user_id, list)?;
        println!("{name}");
        print_tasks(db, &tasks);
        Ok(())
    })
}

pub fn cmd_list_rename(app: &App, list: &str, name: &str) -> Result<()> {
    app.write(|db, session| lists::rename_list(db, &session.user_id, list, name))?;
    println!("List renamed to '{}'.", name.trim());
    Ok(())
}

pub fn cmd_list_remove(app: &App, list: &str) -> Result<()> {
    let removed = app.write(|db, session| lists::delete_list(db, &session.user_id, list))?;
    println!("List removed along with {removed} task(s).");
    Ok(())
}

pub fn cmd_task_add(app: &App, name: &str, list: Option<String>, space: Option<String>) -> Result<()> {
    let target = match (list, space) {
        (Some(l), _) => TaskTarget::List(l),
        (None, Some(s)) => TaskTarget::Space(s),
        (None, None) => TaskTarget::MyDay,
    };
    let task = app.write(|db, session| tasks::add_task(db, &session.user_id, name, target, Local::now()))?;
    println!("Task added (id = {}).", short(&task.id));
    Ok(())
}

pub fn cmd_task_complete(app: &App, task: &str, completed: bool) -> Result<()> {
    app.write(|db, session| tasks::set_completed(db, &session.user_id, task, completed, Local::now()))?;
    if completed {
        println!("Task {task} marked as complete.");
    } else {
        println!("Task {task} marked as not completed.");
    }
    Ok(())
}

pub fn cmd_task_edit(app: &App, task: &str, update: TaskUpdate) -> Result<()> {
    let t = app.write(|db, session| tasks::update_task(db, &session.user_id, task, update, Local::now()))?;
    println!("Task {} updated.", short(&t.id));
    Ok(())
}

pub fn cmd_task_remove(app: &App, task: &str) -> Result<()> {
    let t = app.write(|db, session| tasks::delete_task(db, &session.user_id, task))?;
    println!("Task {} removed.", short(&t.id));
    Ok(())
}

/// Full details of one task, including its subtasks.
pub fn cmd_task_show(app: &App, task: &str) -> Result<()> {
    app.read(|db, session| {
        let (t, editable) = tasks::visible_task(db, &session.user_id, task)?;
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.add_row(vec![Cell::new("ID").add_attribute(Attribute::Bold), Cell::new(&t.id)]);
        table.add_row(vec![Cell::new("Name").add_attribute(Attribute::Bold), Cell::new(&t.name)]);
        table.add_row(vec![
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new(if t.completed { "Completed" } else { "Not Completed" }),
        ]);
        table.add_row(vec![Cell::new("List").add_attribute(Attribute::Bold), Cell::new(location(db, t))]);
        table.add_row(vec![
            Cell::new("Assigned To").add_attribute(Attribute::Bold),
            Cell::new(spaces::email_for(db, &t.user_id)),
        ]);
        table.add_row(vec![
            Cell::new("Start At").add_attribute(Attribute::Bold),
            Cell::new(format!("{} {}", t.date, t.time.format("%H:%M"))),
        ]);
        table.add_row(vec![
            Cell::new("Deadline").add_attribute(Attribute::Bold),
            Cell::new(t.deadline.format("%Y-%m-%d %H:%M")),
        ]);
        table.add_row(vec![Cell::new("Notes").add_attribute(Attribute::Bold), Cell::new(&t.notes)]);
        table.add_row(vec![
            Cell::new("Last Updated").add_attribute(Attribute::Bold),
            Cell::new(t.last_updated.with_timezone(&Local).format("%Y-%m-%d %H:%M")),
        ]);
        table.add_row(vec![
            Cell::new("Editable").add_attribute(Attribute::Bold),
            Cell::new(if editable { "yes" } else { "no (viewer)" }),
        ]);
        println!("{table}");

        let subtasks = tasks::subtasks_of(db, &t.id);
        if subtasks.is_empty() {
            return Ok(());
        }
        let mut sub = Table::new();
        sub.load_preset(UTF8_FULL).set_header(header(&["ID", "Subtask", "Status"]));
        for s in subtasks {
            sub.add_row(vec![
                Cell::new(short(&s.id)),
                Cell::new(&s.name),
                Cell::new(if s.completed { "Done" } else { "Pending" })
                    .fg(if s.completed { Color::Green } else { Color::Yellow }),
            ]);
        }
        println!("{sub}");
        Ok(())
    })
}

pub fn cmd_subtask_add(app: &App, task: &str, name: &str) -> Result<()> {
    let s = app.write(|db, session| tasks::add_subtask(db, &session.user_id, task, name))?;
    println!("Subtask added (id = {}).", short(&s.id));
    Ok(())
}

pub fn cmd_subtask_complete(app: &App, subtask: &str, completed: bool) -> Result<()> {
    app.write(|db, session| tasks::set_subtask_completed(db, &session.user_id, subtask, completed))?;
    println!("Subtask {subtask} updated.");
    Ok(())
}

pub fn cmd_subtask_remove(app: &App, subtask: &str) -> Result<()> {
    app.write(|db, session| tasks::delete_subtask(db, &session.user_id, subtask))?;
    println!("Subtask {subtask} removed.");
    Ok(())
}

/// Tasks scheduled for today.
pub fn cmd_myday(app: &App) -> Result<()> {
    app.read(|db, session| {
        let today = Local::now().date_naive();
        println!("My Day");
        print_tasks(db, &tasks::my_day(db, &session.user_id, today));
        Ok(())
    })
}

/// Tasks over the coming days, one section per weekday.
pub fn cmd_week(app: &App) -> Result<()> {
    app.read(|db, session| {
        let today = Local::now().date_naive();
        let window = app.config.week_window_days;
        let upcoming = tasks::upcoming(db, &session.user_id, today, window);
        print_groups(db, &group_by_weekday(upcoming, today, window));
        Ok(())
    })
}

/// All of the user's tasks, grouped alphabetically.
pub fn cmd_all(app: &App) -> Result<()> {
    app.read(|db, session| {
        let owned = tasks::owned_tasks(db, &session.user_id);
        if owned.is_empty() {
            println!("No tasks found.");
            return Ok(());
        }
        print_groups(db, &group_by_letter(owned));
        Ok(())
    })
}

pub fn cmd_agenda(app: &App) -> Result<()> {
    app.read(|db, session| {
        let sections = agenda(tasks::owned_tasks(db, &session.user_id));
        if sections.is_empty() {
            println!("No tasks found.");
        }
        for section in sections {
            println!("{}", section.title);
            for event in section.events {
                println!("  {}  {}  [{}]", event.hour, event.title, short(&event.id));
            }
        }
        Ok(())
    })
}

pub fn cmd_search(app: &App, query: &str) -> Result<()> {
    app.read(|db, session| {
        print_tasks(db, &tasks::search(db, &session.user_id, query));
        Ok(())
    })
}

pub fn cmd_space_create(app: &App, name: &str) -> Result<()> {
    let space = app.write(|db, session| {
        spaces::create_space(db, &session.user_id, name, app.config.share_code_length)
    })?;
    println!(
        "Share space '{}' created (id = {}). Invite people by code: {}",
        space.name,
        short(&space.id),
        space.share_code
    );
    Ok(())
}

pub fn cmd_space_join(app: &App, code: &str) -> Result<()> {
    let space = app.write(|db, session| spaces::join_space(db, &session.user_id, code))?;
    println!("You have joined the space '{}'.", space.name);
    Ok(())
}

pub fn cmd_space_ls(app: &App) -> Result<()> {
    app.read(|db, session| {
        let spaces = spaces::spaces_for_user(db, &session.user_id);
        if spaces.is_empty() {
            println!("No share spaces found.");
            return Ok(());
        }
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_header(header(&["ID", "Name", "Role", "Members", "Code"]));
        for s in spaces {
            table.add_row(vec![
                Cell::new(short(&s.id)),
                Cell::new(&s.name),
                Cell::new(s.role_of(&session.user_id).map(|r| r.to_string()).unwrap_or_default()),
                Cell::new(s.members.len()),
                Cell::new(&s.share_code),
            ]);
        }
        println!("{table}");
        Ok(())
    })
}

/// Tasks of a share space, all of them or only the user's own.
pub fn cmd_space_show(app: &App, space: &str, mine: bool) -> Result<()> {
    app.read(|db, session| {
        let name = spaces::visible_space(db, &session.user_id, space)?.name.clone();
        let filter = if mine { SpaceFilter::Mine } else { SpaceFilter::All };
        let tasks = tasks::space_tasks(db, &session.user_id, space, filter)?;
        println!("{name}");
        if tasks.is_empty() {
            println!("Please add a task to get started!");
            return Ok(());
        }
        println!("{}", task_table(db, &tasks));
        Ok(())
    })
}

pub fn cmd_space_members(app: &App, space: &str) -> Result<()> {
    app.read(|db, session| {
        let s = spaces::visible_space(db, &session.user_id, space)?;
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_header(header(&["ID", "Email", "Role"]));
        for m in spaces::members(db, s) {
            let role_color = match m.role {
                Role::Owner => Color::Cyan,
                Role::Editor => Color::Green,
                Role::Viewer => Color::Reset,
            };
            table.add_row(vec![
                Cell::new(short(&m.user_id)),
                Cell::new(&m.email),
                Cell::new(m.role).fg(role_color),
            ]);
        }
        println!("{table}");
        println!("Invite people by code: {}", s.share_code);
        Ok(())
    })
}

pub fn cmd_space_role(app: &App, space: &str, member: &str, role: Role) -> Result<()> {
    app.write(|db, session| {
        let s = spaces::visible_space(db, &session.user_id, space)?;
        let space_id = s.id.clone();
        let member_id = spaces::find_member(db, s, member)?;
        spaces::update_member_role(db, &session.user_id, &space_id, &member_id, role)
    })?;
    println!("Role of {member} set to {role}.");
    Ok(())
}

pub fn cmd_space_rename(app: &App, space: &str, name: &str) -> Result<()> {
    app.write(|db, session| spaces::rename_space(db, &session.user_id, space, name))?;
    println!("Share space renamed to '{}'.", name.trim());
    Ok(())
}

pub fn cmd_space_remove(app: &App, space: &str) -> Result<()> {
    let removed = app.write(|db, session| spaces::delete_space(db, &session.user_id, space))?;
    println!("Share space removed along with {removed} task(s).");
    Ok(())
}

/// Prints the invite code so it can be passed on.
pub fn cmd_space_code(app: &App, space: &str) -> Result<()> {
    app.read(|db, session| {
        let s = spaces::visible_space(db, &session.user_id, space)?;
        println!("{}", s.share_code);
        Ok(())
    })
}

/// Maps a shell name given to `completions` onto a generator.
pub fn parse_shell(name: &str) -> Result<Shell> {
    match name.trim().to_lowercase().as_str() {
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        "fish" => Ok(Shell::Fish),
        "powershell" => Ok(Shell::PowerShell),
        "elvish" => Ok(Shell::Elvish),
        _ => Err(Error::UnsupportedShell(name.to_string())),
    }
}

/// Deletes every record and the session.
pub fn cmd_reset(app: &App, force: bool) -> Result<()> {
    if !force {
        print!("Are you sure you want to delete all users, lists, tasks and share spaces? This cannot be undone. [y/N] ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return Ok(());
        }
    }
    app.store.delete_all()?;
    println!("Database reset successfully.");
    Ok(())
}
