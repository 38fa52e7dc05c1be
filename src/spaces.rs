//! Share spaces: creation, invite codes, membership and roles.

use std::collections::BTreeMap;

use rand::Rng;

use crate::error::{Error, Result};
use crate::models::{new_id, Database, Member, Role, ShareSpace};
use crate::permissions::{can_change_role, can_manage_space, can_view_space};

const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Random invite code of `len` uppercase letters and digits.
pub fn generate_share_code(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len.max(1))
        .map(|_| CODE_CHARSET[rng.random_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

/// Random draws tried before giving up on finding a free code.
const CODE_ATTEMPTS: usize = 1000;

fn unique_share_code(db: &Database, len: usize) -> Result<String> {
    for _ in 0..CODE_ATTEMPTS {
        let code = generate_share_code(len);
        if !db.share_spaces.iter().any(|s| s.share_code == code) {
            return Ok(code);
        }
    }
    tracing::warn!(len, spaces = db.share_spaces.len(), "share codes exhausted");
    Err(Error::ShareCodesExhausted(len.max(1)))
}

/// Resolves `key` to a space the user can see. Spaces the user does not
/// belong to are reported as missing.
pub fn visible_space<'a>(db: &'a Database, user_id: &str, key: &str) -> Result<&'a ShareSpace> {
    let space = db.space(key)?;
    if !can_view_space(user_id, space) {
        return Err(Error::NotFound { kind: "Share space", id: key.to_string() });
    }
    Ok(space)
}

/// Creates a space owned by `user_id`, who becomes its first member.
pub fn create_space(db: &mut Database, user_id: &str, name: &str, code_len: usize) -> Result<ShareSpace> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::EmptyName("Share space"));
    }
    let mut members = BTreeMap::new();
    members.insert(user_id.to_string(), Role::Owner);
    let space = ShareSpace {
        id: new_id(),
        name: name.to_string(),
        user_id: user_id.to_string(),
        share_code: unique_share_code(db, code_len)?,
        members,
    };
    db.share_spaces.push(space.clone());
    tracing::info!(space = %space.id, "share space created");
    Ok(space)
}

/// Joins the space whose invite code is `code`.
///
/// Newcomers get [`Role::Viewer`]. Existing members keep their role.
pub fn join_space(db: &mut Database, user_id: &str, code: &str) -> Result<ShareSpace> {
    let code = code.trim().to_uppercase();
    if code.is_empty() {
        return Err(Error::InvalidCode(code));
    }
    let space = db
        .share_spaces
        .iter_mut()
        .find(|s| s.share_code == code)
        .ok_or_else(|| Error::InvalidCode(code.clone()))?;
    if space.members.contains_key(user_id) {
        tracing::debug!(space = %space.id, "already a member");
    } else {
        space.members.insert(user_id.to_string(), Role::Viewer);
        tracing::info!(space = %space.id, user = %user_id, "joined share space");
    }
    Ok(space.clone())
}

pub fn spaces_for_user<'a>(db: &'a Database, user_id: &str) -> Vec<&'a ShareSpace> {
    db.share_spaces.iter().filter(|s| can_view_space(user_id, s)).collect()
}

/// Email of a user, or `"Unknown"` when the account is gone.
pub fn email_for(db: &Database, user_id: &str) -> String {
    db.users
        .iter()
        .find(|u| u.id == user_id)
        .map(|u| u.email.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Members of `space` joined with their emails, owner first.
pub fn members(db: &Database, space: &ShareSpace) -> Vec<Member> {
    let mut out: Vec<Member> = space
        .members
        .iter()
        .map(|(user_id, role)| Member {
            space_id: space.id.clone(),
            user_id: user_id.clone(),
            role: *role,
            email: email_for(db, user_id),
        })
        .collect();
    out.sort_by(|a, b| a.role.cmp(&b.role).then_with(|| a.email.cmp(&b.email)));
    out
}

/// Finds a member by user id prefix or email.
pub fn find_member(db: &Database, space: &ShareSpace, key: &str) -> Result<String> {
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::NotAMember(key.to_string()));
    }
    if let Some(user) = db.user_by_email(key) {
        if space.members.contains_key(&user.id) {
            return Ok(user.id.clone());
        }
        return Err(Error::NotAMember(key.to_string()));
    }
    let hits: Vec<&String> = space.members.keys().filter(|id| id.starts_with(key)).collect();
    match hits.as_slice() {
        [one] => Ok((*one).clone()),
        [] => Err(Error::NotAMember(key.to_string())),
        _ => Err(Error::AmbiguousId { kind: "Member", prefix: key.to_string() }),
    }
}

pub fn update_member_role(
    db: &mut Database,
    actor_id: &str,
    space_key: &str,
    member_id: &str,
    role: Role,
) -> Result<()> {
    let i = db.space_index(space_key)?;
    let space = &mut db.share_spaces[i];
    let actor = space
        .role_of(actor_id)
        .ok_or_else(|| Error::NotAMember(actor_id.to_string()))?;
    let current = space
        .role_of(member_id)
        .ok_or_else(|| Error::NotAMember(member_id.to_string()))?;
    if !can_change_role(actor, current, role) {
        tracing::warn!(space = %space.id, actor = %actor_id, "role change denied");
        return Err(Error::PermissionDenied(format!(
            "A {actor} cannot change a {current} to {role}."
        )));
    }
    space.members.insert(member_id.to_string(), role);
    tracing::info!(space = %space.id, member = %member_id, %role, "member role updated");
    Ok(())
}

fn managed_space_index(db: &Database, user_id: &str, key: &str, action: &str) -> Result<usize> {
    let i = db.space_index(key)?;
    let space = &db.share_spaces[i];
    if !can_view_space(user_id, space) {
        return Err(Error::NotFound { kind: "Share space", id: key.to_string() });
    }
    if !can_manage_space(space.role_of(user_id)) {
        tracing::warn!(space = %space.id, user = %user_id, action, "denied");
        return Err(Error::PermissionDenied(format!(
            "Only the owner can {action} the share space."
        )));
    }
    Ok(i)
}

pub fn rename_space(db: &mut Database, user_id: &str, key: &str, name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::EmptyName("Share space"));
    }
    let i = managed_space_index(db, user_id, key, "update the name of")?;
    db.share_spaces[i].name = name.to_string();
    Ok(())
}

/// Deletes the space, its tasks and their subtasks. Returns the number of
/// tasks removed.
pub fn delete_space(db: &mut Database, user_id: &str, key: &str) -> Result<usize> {
    let i = managed_space_index(db, user_id, key, "delete")?;
    let space = db.share_spaces.remove(i);
    let removed = db.remove_tasks_where(|t| t.list_id.as_deref() == Some(space.id.as_str()));
    tracing::info!(space = %space.id, tasks = removed, "share space deleted");
    Ok(removed)
}
