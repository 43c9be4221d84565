//! Time evaluation for active instances.
//!
//! # Responsibility
//! - Compute remaining time and completion for one instance at a given time.
//! - Build the ordered, display-ready view of the whole active set.
//!
//! # Invariants
//! - All functions are pure in `(instance, definitions, now)`.
//! - Orphaned instances (missing process or plot) are skipped, never errors.
//! - Output is sorted by remaining time ascending, then by instance id.

use crate::model::active::{ActiveId, ActiveProcess};
use crate::model::plot::PlotId;
use crate::model::process::{Process, ProcessId, MILLIS_PER_MINUTE};
use crate::service::definitions::DefinitionStore;

const MILLIS_PER_SECOND: i64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStatus {
    InProgress,
    Completed,
}

/// One active instance joined with its definitions at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluatedProcess {
    pub active_id: ActiveId,
    pub process_id: ProcessId,
    pub plot_id: PlotId,
    pub process_name: String,
    pub plot_name: String,
    pub plot_description: String,
    pub duration_minutes: i64,
    pub start_time_millis: i64,
    pub end_time_millis: i64,
    /// Signed; zero or negative means complete.
    pub remaining_millis: i64,
    pub status: ProgressStatus,
    pub notified: bool,
}

impl EvaluatedProcess {
    pub fn is_complete(&self) -> bool {
        self.status == ProgressStatus::Completed
    }

    /// `remaining_millis` rendered by `format_remaining`.
    pub fn remaining_label(&self) -> String {
        format_remaining(self.remaining_millis)
    }
}

/// Milliseconds until `instance` completes; non-positive once complete.
pub fn remaining_millis(instance: &ActiveProcess, process: &Process, now_millis: i64) -> i64 {
    instance.end_time_millis(process).saturating_sub(now_millis)
}

pub fn is_complete(instance: &ActiveProcess, process: &Process, now_millis: i64) -> bool {
    remaining_millis(instance, process, now_millis) <= 0
}

/// Evaluates one instance, or `None` when it is orphaned.
pub fn evaluate_one(
    instance: &ActiveProcess,
    definitions: &DefinitionStore,
    now_millis: i64,
) -> Option<EvaluatedProcess> {
    let process = definitions.process(instance.process_id)?;
    let plot = definitions.plot(instance.plot_id)?;
    let remaining = remaining_millis(instance, process, now_millis);
    let status = if remaining <= 0 {
        ProgressStatus::Completed
    } else {
        ProgressStatus::InProgress
    };

    Some(EvaluatedProcess {
        active_id: instance.id,
        process_id: process.id,
        plot_id: plot.id,
        process_name: process.name.clone(),
        plot_name: plot.name.clone(),
        plot_description: plot.description.clone(),
        duration_minutes: process.duration_minutes,
        start_time_millis: instance.start_time_millis,
        end_time_millis: instance.end_time_millis(process),
        remaining_millis: remaining,
        status,
        notified: instance.notified,
    })
}

/// Evaluates the active set, dropping orphans, soonest completion first.
pub fn evaluate(
    active: &[ActiveProcess],
    definitions: &DefinitionStore,
    now_millis: i64,
) -> Vec<EvaluatedProcess> {
    let mut rows: Vec<EvaluatedProcess> = active
        .iter()
        .filter_map(|instance| evaluate_one(instance, definitions, now_millis))
        .collect();
    rows.sort_by_key(|row| (row.remaining_millis, row.active_id));
    rows
}

/// Signed `(minutes, seconds)` of a millisecond span, truncated toward zero.
pub fn split_remaining(millis: i64) -> (i64, i64) {
    let minutes = millis / MILLIS_PER_MINUTE;
    let seconds = (millis % MILLIS_PER_MINUTE) / MILLIS_PER_SECOND;
    (minutes, seconds)
}

/// Renders a span as `"{m}m {s}s"`, with a leading `-` when overdue.
pub fn format_remaining(millis: i64) -> String {
    let (minutes, seconds) = split_remaining(millis);
    let sign = if millis < 0 && (minutes != 0 || seconds != 0) {
        "-"
    } else {
        ""
    };
    format!("{sign}{}m {}s", minutes.unsigned_abs(), seconds.unsigned_abs())
}

/// Renders a process duration as `HH:MM`.
pub fn format_duration_minutes(duration_minutes: i64) -> String {
    let sign = if duration_minutes < 0 { "-" } else { "" };
    let total = duration_minutes.unsigned_abs();
    format!("{sign}{:02}:{:02}", total / 60, total % 60)
}
