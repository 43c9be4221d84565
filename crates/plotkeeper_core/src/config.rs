//! Runtime configuration for the core context.
//!
//! # Invariants
//! - `tick_interval` is never zero.
//! - `log_dir`, when set, is absolute (same rule as `init_logging`).

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default period between tick re-evaluations.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
/// File name used when a data directory is given instead of a file path.
pub const DEFAULT_DB_FILE_NAME: &str = "plotkeeper.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroTickInterval,
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroTickInterval => write!(f, "tick interval must be greater than zero"),
            Self::RelativeLogDir(path) => {
                write!(f, "log_dir must be an absolute path, got `{}`", path.display())
            }
        }
    }
}

impl Error for ConfigError {}

/// Settings consumed by `PlotKeeper::open` and `TrackingSession::open`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite file backing the key-value store; `None` keeps state in memory.
    pub db_path: Option<PathBuf>,
    pub tick_interval: Duration,
    pub log_level: String,
    /// Rolling log directory; `None` leaves logging uninitialized.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            tick_interval: DEFAULT_TICK_INTERVAL,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Config storing the database as `plotkeeper.sqlite3` inside `data_dir`.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::default().with_db_path(data_dir.as_ref().join(DEFAULT_DB_FILE_NAME))
    }

    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = Some(path.into());
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_logging(mut self, level: impl Into<String>, log_dir: impl Into<PathBuf>) -> Self {
        self.log_level = level.into();
        self.log_dir = Some(log_dir.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval.is_zero() {
            return Err(ConfigError::ZeroTickInterval);
        }
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir.clone()));
            }
        }
        Ok(())
    }
}
