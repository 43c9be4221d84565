//! Periodic tick scheduling.
//!
//! # Responsibility
//! - Run `PlotKeeper::tick` on a fixed interval off the caller's thread.
//! - Stop cleanly on teardown with no worker left behind.
//!
//! # Invariants
//! - All access to a shared `PlotKeeper` goes through one mutex, so every
//!   tick observes the latest committed mutation.
//! - `TickHandle::stop` and `Drop` both join the worker thread.
//! - The tick callback runs after the lock is released.

use crate::clock::Clock;
use crate::config::CoreConfig;
use crate::context::{OpenError, PlotKeeper, TickOutcome};
use crate::repo::kv_repo::{KvStore, SqliteKvStore};
use crate::service::notifier::AlertSink;
use log::{debug, error, info};
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const TICK_THREAD_NAME: &str = "plotkeeper-tick";

pub type SharedPlotKeeper<S = SqliteKvStore> = Arc<Mutex<PlotKeeper<S>>>;

pub fn share<S: KvStore>(keeper: PlotKeeper<S>) -> SharedPlotKeeper<S> {
    Arc::new(Mutex::new(keeper))
}

/// Locks the shared context, recovering the guard if a holder panicked.
pub fn lock_keeper<S: KvStore>(keeper: &SharedPlotKeeper<S>) -> MutexGuard<'_, PlotKeeper<S>> {
    keeper.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owner of a running tick worker.
pub struct TickHandle {
    stop_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
    ticks: Arc<AtomicU64>,
}

impl TickHandle {
    /// Spawns a worker ticking `keeper` every `interval` and passing each
    /// outcome to `on_tick`.
    pub fn spawn<S, F>(
        keeper: SharedPlotKeeper<S>,
        interval: Duration,
        mut on_tick: F,
    ) -> io::Result<Self>
    where
        S: KvStore + Send + 'static,
        F: FnMut(&TickOutcome) + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let ticks = Arc::new(AtomicU64::new(0));
        let worker_ticks = Arc::clone(&ticks);

        let worker = thread::Builder::new()
            .name(TICK_THREAD_NAME.to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let outcome = lock_keeper(&keeper).tick();
                        worker_ticks.fetch_add(1, Ordering::SeqCst);
                        on_tick(&outcome);
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        info!(
            "event=ticker_start module=scheduler status=ok interval_ms={}",
            interval.as_millis()
        );
        Ok(Self {
            stop_tx: Some(stop_tx),
            worker: Some(worker),
            ticks,
        })
    }

    /// Number of ticks completed so far.
    pub fn tick_count(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.is_finished())
    }

    /// Stops the worker and waits for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        let Some(worker) = self.worker.take() else {
            return;
        };
        match worker.join() {
            Ok(()) => info!(
                "event=ticker_stop module=scheduler status=ok ticks={}",
                self.tick_count()
            ),
            Err(_) => error!("event=ticker_stop module=scheduler status=error error_code=worker_panicked"),
        }
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// A context plus its tick worker, from `start` to `teardown`.
pub struct TrackingSession<S: KvStore + Send + 'static = SqliteKvStore> {
    keeper: SharedPlotKeeper<S>,
    ticker: Option<TickHandle>,
    interval: Duration,
}

impl TrackingSession<SqliteKvStore> {
    /// Opens the context from `config` and ticks it every
    /// `config.tick_interval`.
    pub fn open<F>(
        config: &CoreConfig,
        clock: Arc<dyn Clock>,
        sink: Box<dyn AlertSink>,
        on_tick: F,
    ) -> Result<Self, OpenError>
    where
        F: FnMut(&TickOutcome) + Send + 'static,
    {
        let keeper = PlotKeeper::open(config, clock, sink)?;
        Self::start(keeper, config.tick_interval, on_tick).map_err(OpenError::Spawn)
    }
}

impl<S: KvStore + Send + 'static> TrackingSession<S> {
    pub fn start<F>(keeper: PlotKeeper<S>, interval: Duration, on_tick: F) -> io::Result<Self>
    where
        F: FnMut(&TickOutcome) + Send + 'static,
    {
        let keeper = share(keeper);
        let ticker = TickHandle::spawn(Arc::clone(&keeper), interval, on_tick)?;
        Ok(Self {
            keeper,
            ticker: Some(ticker),
            interval,
        })
    }

    /// Period between ticks.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs `f` with exclusive access to the context.
    pub fn with<R>(&self, f: impl FnOnce(&mut PlotKeeper<S>) -> R) -> R {
        f(&mut lock_keeper(&self.keeper))
    }

    pub fn shared(&self) -> SharedPlotKeeper<S> {
        Arc::clone(&self.keeper)
    }

    pub fn tick_count(&self) -> u64 {
        self.ticker.as_ref().map_or(0, TickHandle::tick_count)
    }

    /// Stops the tick worker and flushes state one last time.
    pub fn teardown(mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.stop();
        }
        if let Err(err) = lock_keeper(&self.keeper).flush() {
            error!("event=teardown module=scheduler status=error error={err}");
        } else {
            debug!("event=teardown module=scheduler status=ok");
        }
    }
}
