//! Active-instance tracker.
//!
//! # Responsibility
//! - Own the set of running process instances.
//! - Validate definition references when an instance starts.
//!
//! # Invariants
//! - Instance ids are unique within the active set.
//! - `start` only succeeds when both referenced definitions exist; later
//!   deletion of a definition leaves the instance in place (orphaned).
//! - The tracker keeps insertion order; display order is the evaluator's job.

use crate::error::{CoreError, CoreResult, RecordKind};
use crate::ids::IdAllocator;
use crate::model::active::{ActiveId, ActiveProcess};
use crate::model::plot::PlotId;
use crate::model::process::ProcessId;
use crate::service::definitions::DefinitionStore;

#[derive(Debug, Clone, Default)]
pub struct ActiveTracker {
    active: Vec<ActiveProcess>,
    ids: IdAllocator,
}

impl ActiveTracker {
    pub fn new(active: Vec<ActiveProcess>) -> Self {
        let ids = IdAllocator::after(active.iter().map(|instance| instance.id));
        Self { active, ids }
    }

    pub fn instances(&self) -> &[ActiveProcess] {
        &self.active
    }

    pub fn get(&self, id: ActiveId) -> Option<&ActiveProcess> {
        self.active.iter().find(|instance| instance.id == id)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Starts a new run of `process_id` on `plot_id` at `now_millis`.
    pub fn start(
        &mut self,
        definitions: &DefinitionStore,
        process_id: ProcessId,
        plot_id: PlotId,
        now_millis: i64,
    ) -> CoreResult<ActiveProcess> {
        if definitions.process(process_id).is_none() {
            return Err(CoreError::ReferenceNotFound {
                kind: RecordKind::Process,
                id: process_id,
            });
        }
        if definitions.plot(plot_id).is_none() {
            return Err(CoreError::ReferenceNotFound {
                kind: RecordKind::Plot,
                id: plot_id,
            });
        }

        let active = &self.active;
        let id = self
            .ids
            .allocate(|candidate| active.iter().any(|instance| instance.id == candidate));
        let instance = ActiveProcess::start(id, process_id, plot_id, now_millis);
        self.active.push(instance.clone());
        Ok(instance)
    }

    /// Restarts an instance from `now_millis` and clears its notification.
    pub fn reset(&mut self, id: ActiveId, now_millis: i64) -> CoreResult<ActiveProcess> {
        let instance = self.find_mut(id)?;
        instance.restart(now_millis);
        Ok(instance.clone())
    }

    /// Flags an instance as notified. Returns `false` if it already was.
    pub fn mark_notified(&mut self, id: ActiveId) -> CoreResult<bool> {
        let instance = self.find_mut(id)?;
        if instance.notified {
            return Ok(false);
        }
        instance.notified = true;
        Ok(true)
    }

    /// Removes one instance if present. Returns whether anything changed.
    pub fn delete(&mut self, id: ActiveId) -> bool {
        let before = self.active.len();
        self.active.retain(|instance| instance.id != id);
        self.active.len() != before
    }

    /// Empties the active set and returns how many instances were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.active.len();
        self.active.clear();
        removed
    }

    fn find_mut(&mut self, id: ActiveId) -> CoreResult<&mut ActiveProcess> {
        self.active
            .iter_mut()
            .find(|instance| instance.id == id)
            .ok_or(CoreError::NotFound {
                kind: RecordKind::ActiveProcess,
                id,
            })
    }
}
