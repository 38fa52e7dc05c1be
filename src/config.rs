use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grouping::MAX_WINDOW_DAYS;

/// Environment variable pointing at an alternative config file.
pub const CONFIG_ENV: &str = "SHARETASK_CONFIG";

/// Settings read from `config.toml`. Every field has a default, so a missing
/// or partial file is fine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory holding `db.json` and `session.json`.
    pub data_dir: Option<PathBuf>,
    /// Length of generated share-space invite codes.
    pub share_code_length: usize,
    /// Days covered by the `week` view, today included.
    pub week_window_days: i64,
    pub min_password_length: usize,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: None,
            share_code_length: 6,
            week_window_days: 7,
            min_password_length: 6,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load config from `$SHARETASK_CONFIG` or `<config_dir>/sharetask/config.toml`.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Rejects values the views and code generator cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_WINDOW_DAYS).contains(&self.week_window_days) {
            return Err(Error::InvalidConfig(format!(
                "week_window_days must be between 1 and {MAX_WINDOW_DAYS}, got {}",
                self.week_window_days
            )));
        }
        if !(1..=32).contains(&self.share_code_length) {
            return Err(Error::InvalidConfig(format!(
                "share_code_length must be between 1 and 32, got {}",
                self.share_code_length
            )));
        }
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        std::env::var(CONFIG_ENV).map(PathBuf::from).unwrap_or_else(|_| {
            let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
            p.push("sharetask");
            p.push("config.toml");
            p
        })
    }
}
