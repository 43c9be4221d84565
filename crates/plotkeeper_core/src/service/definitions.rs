//! Definition store for plots and process templates.
//!
//! # Responsibility
//! - Own the plot and process catalogs and their CRUD rules.
//! - Allocate ids that never collide with stored or user-assigned ones.
//!
//! # Invariants
//! - Ids are unique within each catalog.
//! - Every stored process satisfies `Process::validate()`.
//! - Deleting a definition never touches active instances.

use crate::error::{CoreError, CoreResult, RecordKind};
use crate::ids::IdAllocator;
use crate::model::plot::{Plot, PlotId};
use crate::model::process::{validate_duration, Process, ProcessId};

#[derive(Debug, Clone, Default)]
pub struct DefinitionStore {
    plots: Vec<Plot>,
    processes: Vec<Process>,
    plot_ids: IdAllocator,
    process_ids: IdAllocator,
}

impl DefinitionStore {
    /// Builds a store over restored catalogs, in their stored order.
    pub fn new(plots: Vec<Plot>, processes: Vec<Process>) -> Self {
        let plot_ids = IdAllocator::after(plots.iter().map(|plot| plot.id));
        let process_ids = IdAllocator::after(processes.iter().map(|process| process.id));
        Self {
            plots,
            processes,
            plot_ids,
            process_ids,
        }
    }

    pub fn plots(&self) -> &[Plot] {
        &self.plots
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    pub fn plot(&self, id: PlotId) -> Option<&Plot> {
        self.plots.iter().find(|plot| plot.id == id)
    }

    pub fn process(&self, id: ProcessId) -> Option<&Process> {
        self.processes.iter().find(|process| process.id == id)
    }

    /// Appends a plot under a freshly allocated id. Names need not be unique.
    pub fn create_plot(&mut self, name: impl Into<String>, description: impl Into<String>) -> Plot {
        let plots = &self.plots;
        let id = self
            .plot_ids
            .allocate(|candidate| plots.iter().any(|plot| plot.id == candidate));
        let plot = Plot::new(id, name, description);
        self.plots.push(plot.clone());
        plot
    }

    /// Appends a plot under a caller-chosen id (zero and negatives allowed).
    pub fn create_plot_with_id(
        &mut self,
        id: PlotId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> CoreResult<Plot> {
        if self.plot(id).is_some() {
            return Err(CoreError::DuplicateId {
                kind: RecordKind::Plot,
                id,
            });
        }
        self.plot_ids.observe(id);
        let plot = Plot::new(id, name, description);
        self.plots.push(plot.clone());
        Ok(plot)
    }

    pub fn update_plot(
        &mut self,
        id: PlotId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> CoreResult<Plot> {
        let plot = self
            .plots
            .iter_mut()
            .find(|plot| plot.id == id)
            .ok_or(CoreError::NotFound {
                kind: RecordKind::Plot,
                id,
            })?;
        plot.name = name.into();
        plot.description = description.into();
        Ok(plot.clone())
    }

    /// Removes the plot if present. Returns whether anything changed.
    pub fn delete_plot(&mut self, id: PlotId) -> bool {
        let before = self.plots.len();
        self.plots.retain(|plot| plot.id != id);
        self.plots.len() != before
    }

    pub fn create_process(
        &mut self,
        name: impl Into<String>,
        duration_minutes: i64,
    ) -> CoreResult<Process> {
        validate_duration(duration_minutes)?;
        let processes = &self.processes;
        let id = self
            .process_ids
            .allocate(|candidate| processes.iter().any(|process| process.id == candidate));
        let process = Process::new(id, name, duration_minutes);
        self.processes.push(process.clone());
        Ok(process)
    }

    /// Replaces name and duration. Validation runs before the lookup, so an
    /// invalid duration is reported even for unknown ids.
    pub fn update_process(
        &mut self,
        id: ProcessId,
        name: impl Into<String>,
        duration_minutes: i64,
    ) -> CoreResult<Process> {
        validate_duration(duration_minutes)?;
        let process = self
            .processes
            .iter_mut()
            .find(|process| process.id == id)
            .ok_or(CoreError::NotFound {
                kind: RecordKind::Process,
                id,
            })?;
        process.name = name.into();
        process.duration_minutes = duration_minutes;
        Ok(process.clone())
    }

    pub fn delete_process(&mut self, id: ProcessId) -> bool {
        let before = self.processes.len();
        self.processes.retain(|process| process.id != id);
        self.processes.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::DefinitionStore;
    use crate::error::{CoreError, RecordKind};
    use crate::model::plot::Plot;
    use crate::model::process::Process;

    fn store() -> DefinitionStore {
        DefinitionStore::new(
            vec![Plot::new(100, "Farm", ""), Plot::new(-1, "Sauna", "")],
            vec![Process::new(1, "Chicken", 60)],
        )
    }

    #[test]
    fn create_plot_allocates_above_existing_ids() {
        let mut store = store();
        let plot = store.create_plot("Orchard", "apples");
        assert_eq!(plot.id, 101);
        assert_eq!(store.plots().len(), 3);
        assert_eq!(store.plot(101), Some(&plot));
    }

    #[test]
    fn explicit_plot_id_rejects_duplicates_and_reserves_id() {
        let mut store = store();
        let err = store.create_plot_with_id(100, "Again", "").unwrap_err();
        assert!(matches!(
            err,
            CoreError::DuplicateId {
                kind: RecordKind::Plot,
                id: 100
            }
        ));

        store.create_plot_with_id(500, "Far", "").unwrap();
        assert_eq!(store.create_plot("Next", "").id, 501);
    }

    #[test]
    fn update_plot_changes_only_matching_record() {
        let mut store = store();
        let updated = store.update_plot(-1, "Steam", "hot").unwrap();
        assert_eq!(updated, Plot::new(-1, "Steam", "hot"));
        assert_eq!(store.plot(100).unwrap().name, "Farm");

        let err = store.update_plot(9, "x", "y").unwrap_err();
        assert!(matches!(err, CoreError::NotFound { id: 9, .. }));
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = store();
        assert!(store.delete_plot(100));
        assert!(!store.delete_plot(100));
        assert!(store.delete_process(1));
        assert!(!store.delete_process(1));
        assert_eq!(store.plots().len(), 1);
        assert!(store.processes().is_empty());
    }

    #[test]
    fn non_positive_duration_is_rejected_without_effect() {
        let mut store = store();
        assert!(matches!(
            store.create_process("Zero", 0),
            Err(CoreError::InvalidInput(_))
        ));
        assert!(matches!(
            store.update_process(1, "Chicken", -10),
            Err(CoreError::InvalidInput(_))
        ));
        assert_eq!(store.processes(), &[Process::new(1, "Chicken", 60)]);
    }

    #[test]
    fn update_process_replaces_name_and_duration() {
        let mut store = store();
        let created = store.create_process("Honey", 45).unwrap();
        assert_eq!(created.id, 2);

        let updated = store.update_process(2, "Honey x4", 50).unwrap();
        assert_eq!(updated.duration_minutes, 50);
        assert_eq!(store.process(2).unwrap().name, "Honey x4");
    }
}
