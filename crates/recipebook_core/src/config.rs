//! Catalog runtime configuration.
//!
//! # Responsibility
//! - Resolve database path and logging settings from the environment.
//! - Reject values the logging and storage bootstrap would refuse later.
//!
//! # Invariants
//! - Loading never panics; unset variables fall back to defaults.
//! - `log_dir`, when set, is an absolute path.

use crate::logging::{absolute_log_dir, LogLevel};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Environment variable holding the SQLite database path.
pub const ENV_DB_PATH: &str = "RECIPEBOOK_DB_PATH";
/// Environment variable holding the log level.
pub const ENV_LOG_LEVEL: &str = "RECIPEBOOK_LOG_LEVEL";
/// Environment variable holding the absolute log directory.
pub const ENV_LOG_DIR: &str = "RECIPEBOOK_LOG_DIR";

/// Database file used when no path is configured.
pub const DEFAULT_DB_FILE_NAME: &str = "recipebook.sqlite3";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub message: String,
}

impl ConfigError {
    fn new(key: &'static str, cause: impl Display) -> Self {
        Self {
            key,
            message: cause.to_string(),
        }
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {}: {}", self.key, self.message)
    }
}

impl Error for ConfigError {}

/// Resolved catalog configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub db_path: PathBuf,
    pub log_level: LogLevel,
    /// File logging is disabled when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: LogLevel::default(),
            log_dir: None,
        }
    }
}

impl CatalogConfig {
    /// Loads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to
    /// its value. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }

        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level
                .parse()
                .map_err(|err| ConfigError::new(ENV_LOG_LEVEL, err))?;
        }

        if let Some(dir) = read(ENV_LOG_DIR) {
            let dir = absolute_log_dir(&dir).map_err(|err| ConfigError::new(ENV_LOG_DIR, err))?;
            config.log_dir = Some(dir);
        }

        Ok(config)
    }
}
