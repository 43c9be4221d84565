//! Completion notification dispatch.
//!
//! # Responsibility
//! - Detect the `Pending -> Notified` transition for each instance.
//! - Fire the external alert side effect once per transition.
//!
//! # Invariants
//! - An instance already `Notified` never fires again until it is reset.
//! - The tracker flag is flipped before the alert is played.

use crate::model::active::ActiveId;
use crate::service::evaluator::EvaluatedProcess;
use crate::service::tracker::ActiveTracker;
use log::{info, warn};

/// Payload handed to the alert sink on completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionAlert {
    pub active_id: ActiveId,
    pub process_name: String,
    pub plot_name: String,
    pub end_time_millis: i64,
    /// Time of the tick that observed completion.
    pub observed_at_millis: i64,
}

/// External "play alert" side effect.
pub trait AlertSink: Send {
    fn play_alert(&self, alert: &CompletionAlert);
}

/// Default sink: records completions in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn play_alert(&self, alert: &CompletionAlert) {
        info!(
            "event=process_complete module=notifier status=ok active_id={} late_ms={}",
            alert.active_id,
            alert.observed_at_millis.saturating_sub(alert.end_time_millis)
        );
    }
}

impl<F> AlertSink for F
where
    F: Fn(&CompletionAlert) + Send,
{
    fn play_alert(&self, alert: &CompletionAlert) {
        self(alert)
    }
}

pub struct NotificationDispatcher {
    sink: Box<dyn AlertSink>,
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::new(Box::new(LogAlertSink))
    }
}

impl NotificationDispatcher {
    pub fn new(sink: Box<dyn AlertSink>) -> Self {
        Self { sink }
    }

    /// Fires alerts for completed rows still pending and marks them notified
    /// in both the tracker and `rows`. Returns the alerts fired this call.
    pub fn dispatch(
        &self,
        rows: &mut [EvaluatedProcess],
        tracker: &mut ActiveTracker,
        now_millis: i64,
    ) -> Vec<CompletionAlert> {
        let mut fired = Vec::new();
        for row in rows.iter_mut() {
            if !row.is_complete() || row.notified {
                continue;
            }
            match tracker.mark_notified(row.active_id) {
                Ok(true) => {}
                Ok(false) => {
                    row.notified = true;
                    continue;
                }
                Err(err) => {
                    warn!(
                        "event=notify module=notifier status=skipped active_id={} error={}",
                        row.active_id, err
                    );
                    continue;
                }
            }
            row.notified = true;

            let alert = CompletionAlert {
                active_id: row.active_id,
                process_name: row.process_name.clone(),
                plot_name: row.plot_name.clone(),
                end_time_millis: row.end_time_millis,
                observed_at_millis: now_millis,
            };
            self.sink.play_alert(&alert);
            fired.push(alert);
        }
        fired
    }
}
