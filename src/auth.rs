use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::models::{new_id, Database, Session, User};

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if !valid {
        return Err(Error::InvalidEmail(email));
    }
    Ok(email)
}

fn check_new_password(password: &str, confirm: &str, min_len: usize) -> Result<()> {
    if password != confirm {
        return Err(Error::PasswordMismatch);
    }
    if password.chars().count() < min_len {
        return Err(Error::WeakPassword(min_len));
    }
    Ok(())
}

/// Hex SHA-256 of `salt` followed by `password`.
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Creates an account. The new user is not signed in by this call.
pub fn register(
    db: &mut Database,
    email: &str,
    password: &str,
    confirm: &str,
    min_len: usize,
) -> Result<User> {
    let email = normalize_email(email)?;
    check_new_password(password, confirm, min_len)?;
    if db.user_by_email(&email).is_some() {
        return Err(Error::EmailTaken(email));
    }

    let salt = new_id();
    let user = User {
        id: new_id(),
        password_hash: hash_password(&salt, password),
        salt,
        email,
        created_at: Utc::now(),
    };
    db.users.push(user.clone());
    tracing::info!(user = %user.id, "user registered");
    Ok(user)
}

/// Checks credentials and returns the session to persist.
pub fn sign_in(db: &Database, email: &str, password: &str) -> Result<Session> {
    let user = db.user_by_email(email).ok_or(Error::InvalidCredentials)?;
    if hash_password(&user.salt, password) != user.password_hash {
        tracing::warn!(user = %user.id, "rejected sign-in");
        return Err(Error::InvalidCredentials);
    }
    Ok(Session { user_id: user.id.clone(), email: user.email.clone() })
}

pub fn change_password(
    db: &mut Database,
    user_id: &str,
    password: &str,
    confirm: &str,
    min_len: usize,
) -> Result<()> {
    check_new_password(password, confirm, min_len)?;
    let user = db
        .users
        .iter_mut()
        .find(|u| u.id == user_id)
        .ok_or_else(|| Error::NotFound { kind: "User", id: user_id.to_string() })?;
    user.salt = new_id();
    user.password_hash = hash_password(&user.salt, password);
    tracing::info!(user = %user_id, "password changed");
    Ok(())
}
