//! Core domain logic for PlotKeeper.
//! Tracks timed processes running on plots and alerts once when each run
//! completes. This crate is the single source of truth for those invariants.

pub mod clock;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod ids;
pub mod logging;
pub mod model;
pub mod persistence;
pub mod repo;
pub mod scheduler;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, CoreConfig};
pub use context::{OpenError, PlotKeeper, TickOutcome};
pub use error::{CoreError, CoreResult, RecordKind};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::active::{ActiveId, ActiveProcess, NotificationState};
pub use model::plot::{Plot, PlotId};
pub use model::process::{Process, ProcessId, ProcessValidationError};
pub use persistence::{PersistenceError, PersistenceGateway, StoredState};
pub use repo::kv_repo::{KvStore, RepoError, RepoResult, SqliteKvStore};
pub use scheduler::{lock_keeper, share, SharedPlotKeeper, TickHandle, TrackingSession};
pub use service::evaluator::{
    format_duration_minutes, format_remaining, EvaluatedProcess, ProgressStatus,
};
pub use service::notifier::{AlertSink, CompletionAlert, LogAlertSink};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
