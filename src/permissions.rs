//! Role checks for share spaces.
//!
//! Everything here is a pure function of ids, records and roles. The
//! operations in [`crate::tasks`] and [`crate::spaces`] call these before
//! touching the database.

use crate::models::{Role, ShareSpace, Task};

/// Whether `user_id` may edit `task`.
///
/// The task's creator (or current assignee) can always edit it. Anyone else
/// needs a membership role in the task's share space other than viewer.
pub fn can_edit_task(user_id: &str, task: &Task, role: Option<Role>) -> bool {
    if task.user_id == user_id {
        return true;
    }
    matches!(role, Some(r) if r != Role::Viewer)
}

/// Whether a member holding `actor` may move a member from `target_current`
/// to `new_role`.
///
/// Owners and editors manage roles. The owner's own role is fixed and
/// ownership cannot be handed out.
pub fn can_change_role(actor: Role, target_current: Role, new_role: Role) -> bool {
    if actor == Role::Viewer {
        return false;
    }
    target_current != Role::Owner && new_role != Role::Owner
}

/// Renaming and deleting a space is reserved to its owner.
pub fn can_manage_space(role: Option<Role>) -> bool {
    role == Some(Role::Owner)
}

pub fn can_view_space(user_id: &str, space: &ShareSpace) -> bool {
    space.user_id == user_id || space.members.contains_key(user_id)
}
