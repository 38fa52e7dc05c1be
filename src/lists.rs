use crate::error::{Error, Result};
use crate::models::{new_id, Database, TaskList};

fn owned_list_index(db: &Database, user_id: &str, key: &str) -> Result<usize> {
    let i = db.list_index(key)?;
    if db.lists[i].user_id != user_id {
        // Someone else's list looks exactly like a missing one.
        return Err(Error::NotFound { kind: "List", id: key.to_string() });
    }
    Ok(i)
}

pub fn create_list(db: &mut Database, user_id: &str, name: &str) -> Result<TaskList> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::EmptyName("List"));
    }
    let list = TaskList { id: new_id(), user_id: user_id.to_string(), name: name.to_string() };
    db.lists.push(list.clone());
    tracing::info!(list = %list.id, "list created");
    Ok(list)
}

pub fn rename_list(db: &mut Database, user_id: &str, key: &str, name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::EmptyName("List"));
    }
    let i = owned_list_index(db, user_id, key)?;
    db.lists[i].name = name.to_string();
    Ok(())
}

/// Removes the list along with its tasks and their subtasks.
/// Returns the number of tasks removed.
pub fn delete_list(db: &mut Database, user_id: &str, key: &str) -> Result<usize> {
    let i = owned_list_index(db, user_id, key)?;
    let list = db.lists.remove(i);
    let removed = db.remove_tasks_where(|t| t.list_id.as_deref() == Some(list.id.as_str()));
    tracing::info!(list = %list.id, tasks = removed, "list deleted");
    Ok(removed)
}

pub fn lists_for_user<'a>(db: &'a Database, user_id: &str) -> Vec<&'a TaskList> {
    db.lists.iter().filter(|l| l.user_id == user_id).collect()
}

/// Resolves `key` to one of the user's lists.
pub fn owned_list<'a>(db: &'a Database, user_id: &str, key: &str) -> Result<&'a TaskList> {
    owned_list_index(db, user_id, key).map(|i| &db.lists[i])
}
