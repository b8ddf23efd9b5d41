//! Engine configuration loaded from TOML.
//!
//! ```toml
//! database_path = "/var/lib/pantry/pantry.sqlite3"
//! log_level = "info"
//! log_dir = "/var/log/pantry"
//! ```
//!
//! Every key is optional. Without `log_dir` no file logging is started.

use crate::db::{open_db, DbError};
use crate::logging::{default_log_level, init_logging};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_DATABASE_FILE: &str = "pantry.sqlite3";

/// Storage and logging settings for one engine process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PantryConfig {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    #[serde(default = "default_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_database_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE_FILE)
}

fn default_level() -> String {
    default_log_level().to_string()
}

impl Default for PantryConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            log_level: default_level(),
            log_dir: None,
        }
    }
}

/// Failure while loading or applying configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Logging(String),
    Database(DbError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::Logging(message) => write!(f, "logging setup failed: {message}"),
            Self::Database(err) => write!(f, "database setup failed: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Logging(_) => None,
            Self::Database(err) => Some(err),
        }
    }
}

impl PantryConfig {
    /// Parses configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Starts file logging when `log_dir` is configured.
    pub fn init_logging(&self) -> Result<(), ConfigError> {
        let Some(log_dir) = &self.log_dir else {
            return Ok(());
        };
        let log_dir = log_dir
            .to_str()
            .ok_or_else(|| ConfigError::Logging("log_dir is not valid UTF-8".to_string()))?;
        init_logging(&self.log_level, log_dir).map_err(ConfigError::Logging)
    }

    /// Opens (and migrates) the configured database file.
    pub fn open_database(&self) -> Result<Connection, ConfigError> {
        open_db(&self.database_path).map_err(ConfigError::Database)
    }
}
