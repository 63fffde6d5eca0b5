//! Host-provided core configuration.
//!
//! # Responsibility
//! - Describe where the task database and logs live, and the log level.
//! - Validate paths before anything touches the file system.
//!
//! # Invariants
//! - Configuration is supplied by the host app; nothing is read from the
//!   process environment.
//! - `data_dir` and `log_dir` are absolute.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Default database file name inside `data_dir`.
pub const DEFAULT_DB_FILE_NAME: &str = "item_database.sqlite3";
const DEFAULT_LOG_SUBDIR: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    RelativePath { field: &'static str, value: PathBuf },
    InvalidDbFileName(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RelativePath { field, value } => write!(
                f,
                "{field} must be an absolute path, got `{}`",
                value.display()
            ),
            Self::InvalidDbFileName(name) => {
                write!(f, "db_file_name must be a plain file name, got `{name}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Core configuration, usually deserialized from host-provided JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// App-private directory holding the database.
    pub data_dir: PathBuf,
    #[serde(default = "default_db_file_name")]
    pub db_file_name: String,
    #[serde(default = "default_level_string")]
    pub log_level: String,
    /// Defaults to `<data_dir>/logs`.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl CoreConfig {
    /// Builds a config with defaults for everything except `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            db_file_name: default_db_file_name(),
            log_level: default_level_string(),
            log_dir: None,
        }
    }

    /// Checks path shapes. Does not create anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_absolute("data_dir", &self.data_dir)?;
        if let Some(log_dir) = &self.log_dir {
            ensure_absolute("log_dir", log_dir)?;
        }

        let name = self.db_file_name.trim();
        let is_plain = !name.is_empty()
            && name != "."
            && name != ".."
            && Path::new(name).file_name().map(|file| file == name) == Some(true);
        if !is_plain {
            return Err(ConfigError::InvalidDbFileName(self.db_file_name.clone()));
        }
        Ok(())
    }

    /// Full path of the task database file.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(self.db_file_name.trim())
    }

    /// Directory for rolling log files.
    pub fn resolved_log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join(DEFAULT_LOG_SUBDIR))
    }
}

fn ensure_absolute(field: &'static str, path: &Path) -> Result<(), ConfigError> {
    if path.is_absolute() {
        Ok(())
    } else {
        Err(ConfigError::RelativePath {
            field,
            value: path.to_path_buf(),
        })
    }
}

fn default_db_file_name() -> String {
    DEFAULT_DB_FILE_NAME.to_string()
}

fn default_level_string() -> String {
    default_log_level().to_string()
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, DEFAULT_DB_FILE_NAME};
    use std::path::PathBuf;

    fn absolute_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(name)
    }

    #[test]
    fn new_applies_defaults() {
        let dir = absolute_dir("todo-config-defaults");
        let config = CoreConfig::new(&dir);

        assert_eq!(config.db_path(), dir.join(DEFAULT_DB_FILE_NAME));
        assert_eq!(config.resolved_log_dir(), dir.join("logs"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_relative_data_dir() {
        let config = CoreConfig::new("relative/data");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RelativePath {
                field: "data_dir",
                ..
            })
        ));
    }

    #[test]
    fn validate_rejects_nested_db_file_name() {
        let mut config = CoreConfig::new(absolute_dir("todo-config-nested"));
        config.db_file_name = "../escape.sqlite3".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDbFileName(_))
        ));

        config.db_file_name = "   ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn deserializes_with_defaults_from_json() {
        let dir = absolute_dir("todo-config-json");
        let json = serde_json::json!({ "data_dir": dir });
        let config: CoreConfig = serde_json::from_value(json).unwrap();

        assert_eq!(config.db_file_name, DEFAULT_DB_FILE_NAME);
        assert_eq!(config.log_dir, None);
        assert!(!config.log_level.is_empty());
    }
}
