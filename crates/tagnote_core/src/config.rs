//! Runtime configuration for tagnote front ends.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `TAGNOTE_*` environment variables.

use crate::logging::{default_log_level, parse_log_level};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "TAGNOTE_DB";
pub const ENV_LOG_LEVEL: &str = "TAGNOTE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TAGNOTE_LOG_DIR";

const DEFAULT_DATA_DIR: &str = ".tagnote";
const DEFAULT_DB_FILE_NAME: &str = "tagnote.sqlite3";

/// Effective configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite file holding the `NOTES` and `TAGS` entries.
    pub db_path: PathBuf,
    /// Normalized level name (`trace|debug|info|warn|error`).
    pub log_level: String,
    /// Directory for rolling log files; logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigLayer {
    db_path: Option<PathBuf>,
    log_level: Option<String>,
    log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Read { path: PathBuf, message: String },
    Parse { path: PathBuf, message: String },
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, message } => {
                write!(f, "failed to read {}: {message}", path.display())
            }
            Self::Parse { path, message } => {
                write!(f, "failed to parse {}: {message}", path.display())
            }
            Self::InvalidLogLevel(value) => write!(f, "invalid log level `{value}`"),
        }
    }
}

impl Error for ConfigError {}

/// Loads configuration from `path` (if given) and the process environment.
pub fn load_config(path: Option<&Path>) -> Result<CoreConfig, ConfigError> {
    load_config_with_env(path, |name| std::env::var(name).ok())
}

/// Same as `load_config`, with an injectable environment lookup.
pub fn load_config_with_env(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<CoreConfig, ConfigError> {
    let file = match path {
        Some(path) => read_layer(path)?,
        None => ConfigLayer::default(),
    };

    let db_path = env(ENV_DB_PATH)
        .map(PathBuf::from)
        .or(file.db_path)
        .unwrap_or_else(|| default_db_path(env("HOME")));
    let raw_level = env(ENV_LOG_LEVEL)
        .or(file.log_level)
        .unwrap_or_else(|| default_log_level().to_string());
    let log_level = parse_log_level(&raw_level)
        .map_err(|_| ConfigError::InvalidLogLevel(raw_level.clone()))?
        .to_string();
    let log_dir = env(ENV_LOG_DIR).map(PathBuf::from).or(file.log_dir);

    Ok(CoreConfig {
        db_path,
        log_level,
        log_dir,
    })
}

fn read_layer(path: &Path) -> Result<ConfigLayer, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|err| ConfigError::Read {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    toml::from_str(&contents).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

fn default_db_path(home: Option<String>) -> PathBuf {
    match home {
        Some(home) if !home.trim().is_empty() => PathBuf::from(home)
            .join(DEFAULT_DATA_DIR)
            .join(DEFAULT_DB_FILE_NAME),
        _ => PathBuf::from(DEFAULT_DB_FILE_NAME),
    }
}

#[cfg(test)]
mod tests {
    use super::{load_config_with_env, ConfigError, ENV_DB_PATH, ENV_LOG_LEVEL};
    use crate::logging::default_log_level;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_use_home_directory() {
        let config = load_config_with_env(None, env_from(&[("HOME", "/home/u")])).unwrap();
        assert_eq!(
            config.db_path,
            PathBuf::from("/home/u/.tagnote/tagnote.sqlite3")
        );
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn environment_overrides_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagnote.toml");
        std::fs::write(
            &path,
            "db_path = \"/from/file.sqlite3\"\nlog_level = \"warn\"\nlog_dir = \"/logs\"\n",
        )
        .unwrap();

        let from_file = load_config_with_env(Some(path.as_path()), env_from(&[])).unwrap();
        assert_eq!(from_file.db_path, PathBuf::from("/from/file.sqlite3"));
        assert_eq!(from_file.log_level, "warn");
        assert_eq!(from_file.log_dir, Some(PathBuf::from("/logs")));

        let overridden = load_config_with_env(
            Some(path.as_path()),
            env_from(&[(ENV_DB_PATH, "/env.sqlite3"), (ENV_LOG_LEVEL, "ERROR")]),
        )
        .unwrap();
        assert_eq!(overridden.db_path, PathBuf::from("/env.sqlite3"));
        assert_eq!(overridden.log_level, "error");
    }

    #[test]
    fn rejects_unknown_keys_and_bad_levels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "colour = \"blue\"\n").unwrap();
        assert!(matches!(
            load_config_with_env(Some(path.as_path()), env_from(&[])).unwrap_err(),
            ConfigError::Parse { .. }
        ));

        let err = load_config_with_env(None, env_from(&[(ENV_LOG_LEVEL, "loud")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidLogLevel("loud".to_string()));
    }
}
