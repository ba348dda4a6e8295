//! Runtime configuration for the stock ledger.
//!
//! # Responsibility
//! - Describe storage location, logging and retry settings in one typed value.
//! - Load settings from JSON and apply `STOCKLEDGER_*` environment overrides.
//!
//! # Invariants
//! - `max_conflict_attempts >= 1`.
//! - `log_dir`, when set, is absolute (required by [`crate::init_logging`]).

use crate::service::stock_ledger::DEFAULT_MAX_CONFLICT_ATTEMPTS;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "STOCKLEDGER_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "STOCKLEDGER_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "STOCKLEDGER_LOG_DIR";
pub const ENV_MAX_CONFLICT_ATTEMPTS: &str = "STOCKLEDGER_MAX_CONFLICT_ATTEMPTS";

/// Default page size for recent movement history.
pub const DEFAULT_RECENT_MOVEMENTS_LIMIT: u32 = 20;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    InvalidValue { key: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config JSON: {err}"),
            Self::InvalidValue { key, message } => write!(f, "invalid `{key}`: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Ledger process settings. Missing JSON fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    /// SQLite file; `None` means an in-memory database.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// Rolling log directory; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    pub max_conflict_attempts: u32,
    pub recent_movements_limit: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: crate::logging::default_log_level().to_string(),
            log_dir: None,
            max_conflict_attempts: DEFAULT_MAX_CONFLICT_ATTEMPTS,
            recent_movements_limit: DEFAULT_RECENT_MOVEMENTS_LIMIT,
        }
    }
}

impl LedgerConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Applies overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`; blank values are ignored.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = lookup(ENV_DB_PATH) {
            self.db_path = Some(PathBuf::from(value.trim()));
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            self.log_level = value.trim().to_string();
        }
        if let Some(value) = lookup(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(value.trim()));
        }
        if let Some(value) = lookup(ENV_MAX_CONFLICT_ATTEMPTS) {
            self.max_conflict_attempts = value.trim().parse().map_err(|err| {
                ConfigError::InvalidValue {
                    key: "max_conflict_attempts",
                    message: format!("`{value}` is not a non-negative integer: {err}"),
                }
            })?;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_conflict_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_conflict_attempts",
                message: "must be at least 1".to_string(),
            });
        }
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "log_level",
                message: "must not be blank".to_string(),
            });
        }
        if let Some(log_dir) = &self.log_dir {
            if !log_dir.is_absolute() {
                return Err(ConfigError::InvalidValue {
                    key: "log_dir",
                    message: format!("must be an absolute path, got `{}`", log_dir.display()),
                });
            }
        }
        Ok(())
    }
}
