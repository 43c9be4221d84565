use plotkeeper_core::{
    CompletionAlert, CoreError, ManualClock, PlotKeeper, ProgressStatus, RecordKind,
    SqliteKvStore,
};
use std::sync::{Arc, Mutex};

struct Harness {
    keeper: PlotKeeper,
    clock: ManualClock,
    alerts: Arc<Mutex<Vec<CompletionAlert>>>,
}

impl Harness {
    /// Chicken (60 min) on Farm (id 100), clock at t=0.
    fn chicken_on_farm() -> Self {
        let clock = ManualClock::new(0);
        let alerts = Arc::new(Mutex::new(Vec::new()));
        let sink_alerts = Arc::clone(&alerts);
        let mut keeper = PlotKeeper::init(
            SqliteKvStore::open_in_memory().unwrap(),
            Arc::new(clock.clone()),
            Box::new(move |alert: &CompletionAlert| {
                sink_alerts.lock().unwrap().push(alert.clone());
            }),
        );
        keeper.create_plot_with_id(100, "Farm", "").unwrap();
        Self {
            keeper,
            clock,
            alerts,
        }
    }

    fn alert_count(&self) -> usize {
        self.alerts.lock().unwrap().len()
    }
}

#[test]
fn chicken_on_farm_scenario() {
    let mut h = Harness::chicken_on_farm();
    let chicken = h.keeper.processes()[0].clone();
    assert_eq!((chicken.id, chicken.duration_minutes), (1, 60));

    let instance = h.keeper.start(1, 100).unwrap();
    assert!(!instance.notified);
    let rows = h.keeper.tick().rows;
    assert_eq!(rows[0].remaining_millis, 3_600_000);
    assert_eq!(rows[0].status, ProgressStatus::InProgress);
    assert_eq!(h.alert_count(), 0);

    h.clock.set(3_600_001);
    let outcome = h.keeper.tick();
    assert!(outcome.rows[0].is_complete());
    assert_eq!(outcome.alerts.len(), 1);
    assert_eq!(h.alert_count(), 1);

    h.clock.set(3_700_000);
    h.keeper.tick();
    assert_eq!(h.alert_count(), 1);

    let reset = h.keeper.reset(instance.id).unwrap();
    assert!(!reset.notified);
    assert_eq!(reset.start_time_millis, 3_700_000);
    let rows = h.keeper.tick().rows;
    assert_eq!(rows[0].remaining_millis, 3_600_000);
    assert!(!rows[0].notified);
}

#[test]
fn notification_fires_once_across_many_ticks_and_again_after_reset() {
    let mut h = Harness::chicken_on_farm();
    let instance = h.keeper.start(1, 100).unwrap();

    for _ in 0..200 {
        h.clock.advance(30_000);
        h.keeper.tick();
    }
    assert_eq!(h.alert_count(), 1);
    assert!(h.keeper.active_processes()[0].notified);

    h.keeper.reset(instance.id).unwrap();
    for _ in 0..200 {
        h.clock.advance(30_000);
        h.keeper.tick();
    }
    assert_eq!(h.alert_count(), 2);
}

#[test]
fn reset_restores_full_duration_regardless_of_state() {
    let mut h = Harness::chicken_on_farm();
    let running = h.keeper.start(1, 100).unwrap();
    h.clock.advance(10 * 60_000);
    let finished = h.keeper.start(2, 100).unwrap();
    h.clock.advance(2 * 60 * 60_000);
    h.keeper.tick();

    for id in [running.id, finished.id] {
        let reset = h.keeper.reset(id).unwrap();
        assert!(!reset.notified);
        let row = h
            .keeper
            .evaluate_now()
            .into_iter()
            .find(|row| row.active_id == id)
            .unwrap();
        assert_eq!(row.remaining_millis, row.duration_minutes * 60_000);
    }
}

#[test]
fn start_with_missing_references_creates_nothing() {
    let mut h = Harness::chicken_on_farm();

    let err = h.keeper.start(99, 100).unwrap_err();
    assert!(matches!(
        err,
        CoreError::ReferenceNotFound {
            kind: RecordKind::Process,
            id: 99
        }
    ));
    let err = h.keeper.start(1, 12_345).unwrap_err();
    assert!(matches!(
        err,
        CoreError::ReferenceNotFound {
            kind: RecordKind::Plot,
            ..
        }
    ));
    assert!(h.keeper.active_processes().is_empty());
}

#[test]
fn delete_and_clear_are_idempotent() {
    let mut h = Harness::chicken_on_farm();
    let first = h.keeper.start(1, 100).unwrap();
    h.keeper.start(2, 100).unwrap();

    h.keeper.delete_active(first.id);
    let after_first = h.keeper.active_processes().to_vec();
    h.keeper.delete_active(first.id);
    assert_eq!(h.keeper.active_processes(), after_first.as_slice());
    assert_eq!(after_first.len(), 1);

    h.keeper.clear_active();
    h.keeper.clear_active();
    assert!(h.keeper.active_processes().is_empty());
    assert!(h.keeper.tick().rows.is_empty());
}

#[test]
fn deleted_definitions_orphan_instances_without_failing_ticks() {
    let mut h = Harness::chicken_on_farm();
    let chicken = h.keeper.start(1, 100).unwrap();
    let honey = h.keeper.start(2, 4172).unwrap();

    h.keeper.delete_process(1);
    h.clock.set(10 * 60 * 60_000);
    let outcome = h.keeper.tick();

    assert_eq!(outcome.rows.len(), 1);
    assert_eq!(outcome.rows[0].active_id, honey.id);
    assert_eq!(outcome.alerts.len(), 1);
    assert_eq!(h.keeper.active_processes().len(), 2);

    h.keeper.delete_plot(4172);
    assert!(h.keeper.tick().rows.is_empty());
    assert!(h
        .keeper
        .active_processes()
        .iter()
        .any(|instance| instance.id == chicken.id && !instance.notified));
}

#[test]
fn rows_are_ordered_soonest_completion_first() {
    let mut h = Harness::chicken_on_farm();
    let sauna = h.keeper.start(5, -1).unwrap();
    let honey = h.keeper.start(2, 100).unwrap();
    let chicken = h.keeper.start(1, 100).unwrap();

    let order: Vec<_> = h.keeper.tick().rows.iter().map(|row| row.active_id).collect();
    assert_eq!(order, vec![honey.id, chicken.id, sauna.id]);
}
