use plotkeeper_core::persistence::{ACTIVE_PROCESSES_KEY, PLOTS_KEY, PROCESSES_KEY};
use plotkeeper_core::{
    ActiveProcess, CoreConfig, KvStore, LogAlertSink, ManualClock, PersistenceGateway, Plot,
    PlotKeeper, Process, SqliteKvStore,
};
use std::path::Path;
use std::sync::Arc;

fn open_keeper(config: &CoreConfig, clock: &ManualClock) -> PlotKeeper {
    PlotKeeper::open(config, Arc::new(clock.clone()), Box::new(LogAlertSink)).unwrap()
}

fn write_raw(path: &Path, key: &str, value: &str) {
    let mut store = SqliteKvStore::open(path).unwrap();
    store.put(key, value).unwrap();
}

#[test]
fn save_then_load_roundtrips_every_collection() {
    let mut gateway = PersistenceGateway::new(SqliteKvStore::open_in_memory().unwrap());
    let plots = vec![
        Plot::new(0, "Terraville", "x"),
        Plot::new(-7, "Cellar", "with \"quotes\" and ünïcode"),
    ];
    let processes = vec![Process::new(3, "Mine", 90), Process::new(11, "Bread", 1)];
    let mut notified = ActiveProcess::start(2, 11, -7, 1_700_000_000_000);
    notified.notified = true;
    let active = vec![ActiveProcess::start(1, 3, 0, 5), notified];

    gateway.save_all(&plots, &processes, &active).unwrap();
    let state = gateway.load_all();

    assert_eq!(state.plots, plots);
    assert_eq!(state.processes, processes);
    assert_eq!(state.active_processes, active);
}

#[test]
fn state_survives_reopen_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = CoreConfig::in_dir(dir.path());
    let clock = ManualClock::new(1_000);

    let (plot, process, instance) = {
        let mut keeper = open_keeper(&config, &clock);
        let plot = keeper.create_plot("Orchard", "apples");
        let process = keeper.create_process("Apples", 20).unwrap();
        let instance = keeper.start(process.id, plot.id).unwrap();
        clock.advance(21 * 60_000);
        assert_eq!(keeper.tick().alerts.len(), 1);
        (plot, process, instance)
    };

    let mut reopened = open_keeper(&config, &clock);
    assert_eq!(reopened.definitions().plot(plot.id), Some(&plot));
    assert_eq!(reopened.definitions().process(process.id), Some(&process));

    let restored = &reopened.active_processes()[0];
    assert_eq!(restored.id, instance.id);
    assert_eq!(restored.start_time_millis, 1_000);
    assert!(restored.notified);

    assert!(reopened.tick().alerts.is_empty());
    let next = reopened.start(process.id, plot.id).unwrap();
    assert!(next.id > instance.id);
}

#[test]
fn corrupt_stored_collection_is_reseeded_on_startup() {
    let dir = tempfile::tempdir().unwrap();
    let config = CoreConfig::in_dir(dir.path());
    let db_path = config.db_path.clone().unwrap();
    let clock = ManualClock::new(0);

    drop(open_keeper(&config, &clock));
    write_raw(&db_path, PROCESSES_KEY, "not json at all");
    write_raw(&db_path, PLOTS_KEY, r#"[{"id":"wrong type"}]"#);

    let keeper = open_keeper(&config, &clock);
    assert_eq!(keeper.processes().len(), 5);
    assert_eq!(keeper.plots().len(), 7);

    let store = SqliteKvStore::open(&db_path).unwrap();
    let raw = store.get(PROCESSES_KEY).unwrap().unwrap();
    let reparsed: Vec<Process> = serde_json::from_str(&raw).unwrap();
    assert_eq!(reparsed, keeper.processes());
}

#[test]
fn legacy_browser_export_loads_as_is() {
    let dir = tempfile::tempdir().unwrap();
    let config = CoreConfig::in_dir(dir.path());
    let db_path = config.db_path.clone().unwrap();
    drop(open_keeper(&config, &ManualClock::new(0)));

    write_raw(
        &db_path,
        PROCESSES_KEY,
        r#"[{"id":481516,"name":"Wine","duration":120}]"#,
    );
    write_raw(
        &db_path,
        ACTIVE_PROCESSES_KEY,
        r#"[{"id":2342,"processId":481516,"plotId":4768,"startTime":0}]"#,
    );
    write_raw(
        &db_path,
        PLOTS_KEY,
        r#"[{"id":4768,"name":"4768","description":"Farm"}]"#,
    );

    let mut keeper = open_keeper(&config, &ManualClock::new(60 * 60_000));
    assert_eq!(keeper.processes()[0].duration_minutes, 120);
    let rows = keeper.tick().rows;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].remaining_millis, 60 * 60_000);
    assert_eq!(rows[0].remaining_label(), "60m 0s");
}
