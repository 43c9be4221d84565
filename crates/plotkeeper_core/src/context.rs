//! Core context owning every collection.
//!
//! # Responsibility
//! - Expose the operation set used by presentation code.
//! - Mirror each successful mutation to the persistence gateway.
//! - Run one evaluation + notification pass per tick.
//!
//! # Invariants
//! - Collections change only through methods on `PlotKeeper`.
//! - A persistence failure never fails or rolls back the in-memory
//!   operation; it is logged and kept in `last_persistence_error`.
//! - Ticks read the latest committed in-memory state.

use crate::clock::Clock;
use crate::config::{ConfigError, CoreConfig};
use crate::error::CoreResult;
use crate::logging::{init_logging, LoggingError};
use crate::model::active::{ActiveId, ActiveProcess};
use crate::model::plot::{Plot, PlotId};
use crate::model::process::{Process, ProcessId};
use crate::persistence::{PersistenceError, PersistenceGateway};
use crate::repo::kv_repo::{KvStore, RepoError, SqliteKvStore};
use crate::service::definitions::DefinitionStore;
use crate::service::evaluator::{evaluate, EvaluatedProcess};
use crate::service::notifier::{AlertSink, CompletionAlert, NotificationDispatcher};
use crate::service::tracker::ActiveTracker;
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Startup failure for `PlotKeeper::open`.
#[derive(Debug)]
pub enum OpenError {
    Config(ConfigError),
    Logging(LoggingError),
    Storage(RepoError),
    /// The tick worker thread could not be spawned.
    Spawn(std::io::Error),
}

impl Display for OpenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid config: {err}"),
            Self::Logging(err) => write!(f, "logging init failed: {err}"),
            Self::Storage(err) => write!(f, "storage open failed: {err}"),
            Self::Spawn(err) => write!(f, "tick worker spawn failed: {err}"),
        }
    }
}

impl Error for OpenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Logging(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Spawn(err) => Some(err),
        }
    }
}

/// Result of one tick.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TickOutcome {
    pub now_millis: i64,
    /// Evaluated non-orphaned instances, soonest completion first.
    pub rows: Vec<EvaluatedProcess>,
    /// Alerts fired by this tick.
    pub alerts: Vec<CompletionAlert>,
}

pub struct PlotKeeper<S: KvStore = SqliteKvStore> {
    definitions: DefinitionStore,
    tracker: ActiveTracker,
    gateway: PersistenceGateway<S>,
    clock: Arc<dyn Clock>,
    dispatcher: NotificationDispatcher,
    last_persistence_error: Option<String>,
}

impl PlotKeeper<SqliteKvStore> {
    /// Validates `config`, starts logging when a log dir is configured, opens
    /// the SQLite store and loads state.
    pub fn open(
        config: &CoreConfig,
        clock: Arc<dyn Clock>,
        sink: Box<dyn AlertSink>,
    ) -> Result<Self, OpenError> {
        config.validate().map_err(OpenError::Config)?;
        if let Some(log_dir) = &config.log_dir {
            init_logging(&config.log_level, log_dir).map_err(OpenError::Logging)?;
        }

        let store = match &config.db_path {
            Some(path) => SqliteKvStore::open(path),
            None => SqliteKvStore::open_in_memory(),
        }
        .map_err(OpenError::Storage)?;

        Ok(Self::init(store, clock, sink))
    }
}

impl<S: KvStore> PlotKeeper<S> {
    /// Loads all collections from `store`, seeding whatever is missing.
    pub fn init(store: S, clock: Arc<dyn Clock>, sink: Box<dyn AlertSink>) -> Self {
        let mut gateway = PersistenceGateway::new(store);
        let state = gateway.load_all();
        info!(
            "event=context_init module=context status=ok plots={} processes={} active={}",
            state.plots.len(),
            state.processes.len(),
            state.active_processes.len()
        );

        Self {
            definitions: DefinitionStore::new(state.plots, state.processes),
            tracker: ActiveTracker::new(state.active_processes),
            gateway,
            clock,
            dispatcher: NotificationDispatcher::new(sink),
            last_persistence_error: None,
        }
    }

    pub fn plots(&self) -> &[Plot] {
        self.definitions.plots()
    }

    pub fn processes(&self) -> &[Process] {
        self.definitions.processes()
    }

    pub fn active_processes(&self) -> &[ActiveProcess] {
        self.tracker.instances()
    }

    pub fn definitions(&self) -> &DefinitionStore {
        &self.definitions
    }

    pub fn gateway(&self) -> &PersistenceGateway<S> {
        &self.gateway
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Message of the most recent failed write, cleared by the next success.
    pub fn last_persistence_error(&self) -> Option<&str> {
        self.last_persistence_error.as_deref()
    }

    pub fn create_plot(&mut self, name: impl Into<String>, description: impl Into<String>) -> Plot {
        let plot = self.definitions.create_plot(name, description);
        info!("event=plot_create module=context status=ok plot_id={}", plot.id);
        self.persist("plot_create");
        plot
    }

    pub fn create_plot_with_id(
        &mut self,
        id: PlotId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> CoreResult<Plot> {
        let plot = self.definitions.create_plot_with_id(id, name, description)?;
        info!("event=plot_create module=context status=ok plot_id={}", plot.id);
        self.persist("plot_create");
        Ok(plot)
    }

    pub fn update_plot(
        &mut self,
        id: PlotId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> CoreResult<Plot> {
        let plot = self.definitions.update_plot(id, name, description)?;
        self.persist("plot_update");
        Ok(plot)
    }

    /// Active instances on this plot stay in place and become orphans.
    pub fn delete_plot(&mut self, id: PlotId) {
        if self.definitions.delete_plot(id) {
            info!("event=plot_delete module=context status=ok plot_id={id}");
            self.persist("plot_delete");
        }
    }

    pub fn create_process(
        &mut self,
        name: impl Into<String>,
        duration_minutes: i64,
    ) -> CoreResult<Process> {
        let process = self.definitions.create_process(name, duration_minutes)?;
        info!(
            "event=process_create module=context status=ok process_id={} duration_minutes={}",
            process.id, process.duration_minutes
        );
        self.persist("process_create");
        Ok(process)
    }

    pub fn update_process(
        &mut self,
        id: ProcessId,
        name: impl Into<String>,
        duration_minutes: i64,
    ) -> CoreResult<Process> {
        let process = self
            .definitions
            .update_process(id, name, duration_minutes)?;
        self.persist("process_update");
        Ok(process)
    }

    /// Active instances of this process stay in place and become orphans.
    pub fn delete_process(&mut self, id: ProcessId) {
        if self.definitions.delete_process(id) {
            info!("event=process_delete module=context status=ok process_id={id}");
            self.persist("process_delete");
        }
    }

    /// Starts `process_id` on `plot_id` at the current clock time.
    pub fn start(&mut self, process_id: ProcessId, plot_id: PlotId) -> CoreResult<ActiveProcess> {
        let now = self.clock.now_millis();
        let instance = self
            .tracker
            .start(&self.definitions, process_id, plot_id, now)?;
        info!(
            "event=active_start module=context status=ok active_id={} process_id={} plot_id={}",
            instance.id, process_id, plot_id
        );
        self.persist("active_start");
        Ok(instance)
    }

    pub fn reset(&mut self, id: ActiveId) -> CoreResult<ActiveProcess> {
        let now = self.clock.now_millis();
        let instance = self.tracker.reset(id, now)?;
        info!("event=active_reset module=context status=ok active_id={id}");
        self.persist("active_reset");
        Ok(instance)
    }

    pub fn delete_active(&mut self, id: ActiveId) {
        if self.tracker.delete(id) {
            info!("event=active_delete module=context status=ok active_id={id}");
            self.persist("active_delete");
        }
    }

    pub fn clear_active(&mut self) {
        let removed = self.tracker.clear();
        if removed > 0 {
            info!("event=active_clear module=context status=ok removed={removed}");
            self.persist("active_clear");
        }
    }

    /// Evaluates the active set at the current time without notifying.
    pub fn evaluate_now(&self) -> Vec<EvaluatedProcess> {
        evaluate(
            self.tracker.instances(),
            &self.definitions,
            self.clock.now_millis(),
        )
    }

    /// Re-evaluates every instance and fires pending completion alerts.
    pub fn tick(&mut self) -> TickOutcome {
        let now = self.clock.now_millis();
        let mut rows = evaluate(self.tracker.instances(), &self.definitions, now);
        let alerts = self.dispatcher.dispatch(&mut rows, &mut self.tracker, now);

        if !alerts.is_empty() {
            debug!(
                "event=tick module=context status=ok rows={} alerts={}",
                rows.len(),
                alerts.len()
            );
            self.persist("notify");
        }

        TickOutcome {
            now_millis: now,
            rows,
            alerts,
        }
    }

    /// Writes all collections now and reports the outcome to the caller.
    pub fn flush(&mut self) -> Result<(), PersistenceError> {
        let result = self.gateway.save_all(
            self.definitions.plots(),
            self.definitions.processes(),
            self.tracker.instances(),
        );
        self.last_persistence_error = result.as_ref().err().map(ToString::to_string);
        result
    }

    fn persist(&mut self, operation: &'static str) {
        if let Err(err) = self.flush() {
            error!(
                "event=persist module=context status=error operation={} error={}",
                operation, err
            );
        }
    }
}
