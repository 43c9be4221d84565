//! Running process instance model.
//!
//! # Responsibility
//! - Bind one process definition to one plot with a start timestamp.
//! - Track the one-shot completion notification flag.
//!
//! # Invariants
//! - `notified` starts `false` and only `restart` clears it again.
//! - End time is always derived from `start_time_millis`; it is never stored.

use crate::model::plot::PlotId;
use crate::model::process::{Process, ProcessId};
use serde::{Deserialize, Serialize};

/// Identifier of an active instance, unique within the active set only.
pub type ActiveId = i64;

/// A running occurrence of a process on a plot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveProcess {
    pub id: ActiveId,
    pub process_id: ProcessId,
    pub plot_id: PlotId,
    /// Unix epoch milliseconds. Accepts the legacy `startTime` key.
    #[serde(alias = "startTime")]
    pub start_time_millis: i64,
    /// Missing in legacy stores; treated as not yet notified.
    #[serde(default)]
    pub notified: bool,
}

/// Notification state derived from the `notified` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationState {
    Pending,
    Notified,
}

impl ActiveProcess {
    /// Creates a fresh, not yet notified instance.
    pub fn start(
        id: ActiveId,
        process_id: ProcessId,
        plot_id: PlotId,
        start_time_millis: i64,
    ) -> Self {
        Self {
            id,
            process_id,
            plot_id,
            start_time_millis,
            notified: false,
        }
    }

    /// Re-stamps the start time and returns to `Pending`.
    pub fn restart(&mut self, now_millis: i64) {
        self.start_time_millis = now_millis;
        self.notified = false;
    }

    /// Scheduled completion time for this run of `process`.
    pub fn end_time_millis(&self, process: &Process) -> i64 {
        self.start_time_millis
            .saturating_add(process.duration_millis())
    }

    pub fn notification_state(&self) -> NotificationState {
        if self.notified {
            NotificationState::Notified
        } else {
            NotificationState::Pending
        }
    }
}
