use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::Result;
use crate::models::{Database, Session};

/// Environment variable overriding the database file location.
pub const DB_ENV: &str = "SHARETASK_DB";

/// Handle on the on-disk records: `db.json` plus `session.json` beside it.
#[derive(Debug, Clone)]
pub struct Store {
    db_path: PathBuf,
}

impl Store {
    /// Uses the given database file; the session file sits in the same directory.
    pub fn at(db_path: impl Into<PathBuf>) -> Self {
        Store { db_path: db_path.into() }
    }

    /// Resolves the database path in this order:
    /// 1. `SHARETASK_DB` environment variable.
    /// 2. `data_dir` from the config.
    /// 3. `~/.local/share/sharetask/db.json` (on Linux).
    /// 4. `./db.json` (fallback).
    pub fn from_config(config: &Config) -> Self {
        let path = std::env::var(DB_ENV).map(PathBuf::from).unwrap_or_else(|_| {
            let mut p = match &config.data_dir {
                Some(dir) => dir.clone(),
                None => {
                    let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
                    p.push("sharetask");
                    p
                }
            };
            p.push("db.json");
            p
        });
        Store::at(path)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn session_path(&self) -> PathBuf {
        let mut p = self.db_path.clone();
        p.pop();
        p.push("session.json");
        p
    }

    /// Loads every record. A missing file is an empty database.
    pub fn load(&self) -> Result<Database> {
        match read_file(&self.db_path)? {
            Some(s) => Ok(serde_json::from_str(&s)?),
            None => Ok(Database::default()),
        }
    }

    /// Overwrites the database file with `db`.
    pub fn save(&self, db: &Database) -> Result<()> {
        let s = serde_json::to_string_pretty(db)?;
        write_file(&self.db_path, &s)?;
        tracing::debug!(
            path = %self.db_path.display(),
            tasks = db.tasks.len(),
            spaces = db.share_spaces.len(),
            "database saved"
        );
        Ok(())
    }

    pub fn load_session(&self) -> Result<Option<Session>> {
        match read_file(&self.session_path())? {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    pub fn save_session(&self, session: &Session) -> Result<()> {
        let s = serde_json::to_string_pretty(session)?;
        write_file(&self.session_path(), &s)
    }

    /// Forgets the signed-in user.
    pub fn clear_session(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Deletes the database and session files.
    pub fn delete_all(&self) -> Result<()> {
        if self.db_path.exists() {
            fs::remove_file(&self.db_path)?;
        }
        self.clear_session()
    }
}

fn read_file(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let mut f = OpenOptions::new().read(true).open(path)?;
    let mut s = String::new();
    f.read_to_string(&mut s)?;
    Ok(Some(s))
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    f.write_all(contents.as_bytes())?;
    Ok(())
}
