use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Generates a fresh record id.
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Membership role inside a share space.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Editor,
    Viewer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Owner => "owner",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        };
        f.write_str(s)
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "owner" => Ok(Role::Owner),
            "editor" => Ok(Role::Editor),
            "viewer" => Ok(Role::Viewer),
            _ => Err(Error::InvalidRole(s.to_string())),
        }
    }
}

/// A registered account.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    /// Normalised (trimmed, lowercase) email address.
    pub email: String,
    /// Hex-encoded SHA-256 of salt + password.
    pub password_hash: String,
    pub salt: String,
    pub created_at: DateTime<Utc>,
}

/// Represents a single task, personal or shared.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Task {
    /// Unique identifier for the task.
    pub id: String,
    /// The name or description of the task.
    pub name: String,
    /// Whether the task has been completed.
    #[serde(default)]
    pub completed: bool,
    /// Owning personal list or share space. `None` for My Day tasks.
    #[serde(default)]
    pub list_id: Option<String>,
    /// Day the task is scheduled for.
    pub date: NaiveDate,
    /// Time of day the task starts.
    pub time: NaiveTime,
    /// Due moment; kept equal to `date` + `time` after every edit.
    pub deadline: NaiveDateTime,
    /// Free-text notes.
    #[serde(default)]
    pub notes: String,
    /// Timestamp of the last change.
    pub last_updated: DateTime<Utc>,
    /// Creator of the task, or the member it was assigned to.
    pub user_id: String,
}

impl Task {
    /// Minutes since midnight, ignoring seconds.
    pub fn minute_of_day(&self) -> u32 {
        use chrono::Timelike;
        self.time.hour() * 60 + self.time.minute()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Subtask {
    pub id: String,
    pub task_id: String,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
}

/// A personal task list.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TaskList {
    pub id: String,
    pub user_id: String,
    pub name: String,
}

/// A named collaborative task list with a membership map and an invite code.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ShareSpace {
    pub id: String,
    pub name: String,
    /// The user that created the space.
    pub user_id: String,
    pub share_code: String,
    #[serde(default)]
    pub members: BTreeMap<String, Role>,
}

impl ShareSpace {
    pub fn role_of(&self, user_id: &str) -> Option<Role> {
        self.members.get(user_id).copied()
    }
}

/// A share-space member joined with the member's email. Never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub space_id: String,
    pub user_id: String,
    pub role: Role,
    pub email: String,
}

/// The signed-in user, persisted between invocations.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
}

/// Every record the application knows about.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Database {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub lists: Vec<TaskList>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub share_spaces: Vec<ShareSpace>,
}

/// Finds the index of the record whose id equals `key`, or failing that the
/// only record whose id starts with it.
fn resolve<'a, T: 'a>(
    items: impl IntoIterator<Item = &'a T>,
    id_of: impl Fn(&T) -> &str,
    kind: &'static str,
    key: &str,
) -> Result<usize> {
    let mut hit = None;
    let mut ambiguous = false;
    for (i, item) in items.into_iter().enumerate() {
        let id = id_of(item);
        if id == key {
            return Ok(i);
        }
        if !key.is_empty() && id.starts_with(key) {
            if hit.is_some() {
                ambiguous = true;
            }
            hit = Some(i);
        }
    }
    if ambiguous {
        return Err(Error::AmbiguousId { kind, prefix: key.to_string() });
    }
    hit.ok_or_else(|| Error::NotFound { kind, id: key.to_string() })
}

impl Database {
    pub fn task_index(&self, key: &str) -> Result<usize> {
        resolve(&self.tasks, |t| t.id.as_str(), "Task", key)
    }

    pub fn subtask_index(&self, key: &str) -> Result<usize> {
        resolve(&self.subtasks, |s| s.id.as_str(), "Subtask", key)
    }

    pub fn list_index(&self, key: &str) -> Result<usize> {
        resolve(&self.lists, |l| l.id.as_str(), "List", key)
    }

    pub fn space_index(&self, key: &str) -> Result<usize> {
        resolve(&self.share_spaces, |s| s.id.as_str(), "Share space", key)
    }

    pub fn space(&self, key: &str) -> Result<&ShareSpace> {
        self.space_index(key).map(|i| &self.share_spaces[i])
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        let email = email.trim().to_lowercase();
        self.users.iter().find(|u| u.email == email)
    }

    /// The share space a task lives in, if any.
    pub fn space_of(&self, task: &Task) -> Option<&ShareSpace> {
        let list_id = task.list_id.as_deref()?;
        self.share_spaces.iter().find(|s| s.id == list_id)
    }

    /// Drops the tasks matching `pred` together with their subtasks.
    pub fn remove_tasks_where(&mut self, pred: impl Fn(&Task) -> bool) -> usize {
        let doomed: Vec<String> = self
            .tasks
            .iter()
            .filter(|t| pred(t))
            .map(|t| t.id.clone())
            .collect();
        self.tasks.retain(|t| !doomed.contains(&t.id));
        self.subtasks.retain(|s| !doomed.contains(&s.task_id));
        doomed.len()
    }
}
