//! Persistence gateway mirroring the three core collections.
//!
//! # Responsibility
//! - Restore plots, processes and active instances at startup, seeding
//!   built-in catalogs on first run.
//! - Write all three collections after every state mutation.
//!
//! # Invariants
//! - Absent, empty or unreadable stored values fall back to the seed and
//!   never fail startup.
//! - `save_all` serializes everything before touching storage; a failed
//!   serialization writes nothing.
//! - Values are JSON arrays stored under `plots`, `processes` and
//!   `activeProcesses`.

use crate::model::active::ActiveProcess;
use crate::model::plot::Plot;
use crate::model::process::Process;
use crate::model::seed::{default_active_processes, default_plots, default_processes};
use crate::repo::kv_repo::{KvStore, RepoError};
use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const PLOTS_KEY: &str = "plots";
pub const PROCESSES_KEY: &str = "processes";
pub const ACTIVE_PROCESSES_KEY: &str = "activeProcesses";

#[derive(Debug)]
pub enum PersistenceError {
    Repo(RepoError),
    Serialize {
        key: &'static str,
        source: serde_json::Error,
    },
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "persistence write failed: {err}"),
            Self::Serialize { key, source } => {
                write!(f, "failed to serialize `{key}`: {source}")
            }
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Serialize { source, .. } => Some(source),
        }
    }
}

impl From<RepoError> for PersistenceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Why a stored collection was replaced by its seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedReason {
    Absent,
    Empty,
    /// Stored text was not a valid collection (`PersistenceCorrupt`).
    Corrupt,
    Unreadable,
}

impl SeedReason {
    fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Empty => "empty",
            Self::Corrupt => "corrupt",
            Self::Unreadable => "unreadable",
        }
    }
}

/// Collections restored by `load_all`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoredState {
    pub plots: Vec<Plot>,
    pub processes: Vec<Process>,
    pub active_processes: Vec<ActiveProcess>,
}

/// Gateway between in-memory collections and a `KvStore`.
pub struct PersistenceGateway<S: KvStore> {
    store: S,
}

impl<S: KvStore> PersistenceGateway<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Reads one collection, writing and returning `seed` when nothing usable
    /// is stored.
    pub fn load<T>(&mut self, key: &'static str, seed: Vec<T>) -> Vec<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let reason = match self.store.get(key) {
            Ok(None) => SeedReason::Absent,
            Ok(Some(raw)) if raw.trim().is_empty() => SeedReason::Empty,
            Ok(Some(raw)) => match serde_json::from_str::<Vec<T>>(&raw) {
                Ok(items) if items.is_empty() => SeedReason::Empty,
                Ok(items) => {
                    debug!(
                        "event=collection_load module=persistence status=ok key={} count={}",
                        key,
                        items.len()
                    );
                    return items;
                }
                Err(err) => {
                    warn!(
                        "event=collection_load module=persistence status=error key={} error_code=persistence_corrupt error={}",
                        key, err
                    );
                    SeedReason::Corrupt
                }
            },
            Err(err) => {
                error!(
                    "event=collection_load module=persistence status=error key={} error_code=storage_read_failed error={}",
                    key, err
                );
                SeedReason::Unreadable
            }
        };

        self.write_seed(key, &seed, reason);
        seed
    }

    /// Restores all three collections with built-in seed fallback.
    pub fn load_all(&mut self) -> StoredState {
        StoredState {
            plots: self.load(PLOTS_KEY, default_plots()),
            processes: self.load(PROCESSES_KEY, default_processes()),
            active_processes: self.load(ACTIVE_PROCESSES_KEY, default_active_processes()),
        }
    }

    /// Serializes and writes all three collections in one storage write.
    pub fn save_all(
        &mut self,
        plots: &[Plot],
        processes: &[Process],
        active_processes: &[ActiveProcess],
    ) -> Result<(), PersistenceError> {
        let plots_json = to_json(PLOTS_KEY, plots)?;
        let processes_json = to_json(PROCESSES_KEY, processes)?;
        let active_json = to_json(ACTIVE_PROCESSES_KEY, active_processes)?;

        self.store.put_many(&[
            (PLOTS_KEY, plots_json.as_str()),
            (PROCESSES_KEY, processes_json.as_str()),
            (ACTIVE_PROCESSES_KEY, active_json.as_str()),
        ])?;

        debug!(
            "event=save_all module=persistence status=ok plots={} processes={} active={}",
            plots.len(),
            processes.len(),
            active_processes.len()
        );
        Ok(())
    }

    fn write_seed<T: Serialize>(&mut self, key: &'static str, seed: &[T], reason: SeedReason) {
        let write_result = to_json(key, seed)
            .and_then(|json| self.store.put(key, &json).map_err(PersistenceError::from));
        match write_result {
            Ok(()) => info!(
                "event=collection_seed module=persistence status=ok key={} reason={} count={}",
                key,
                reason.as_str(),
                seed.len()
            ),
            Err(err) => error!(
                "event=collection_seed module=persistence status=error key={} reason={} error={}",
                key,
                reason.as_str(),
                err
            ),
        }
    }
}

fn to_json<T: Serialize + ?Sized>(key: &'static str, value: &T) -> Result<String, PersistenceError> {
    serde_json::to_string(value).map_err(|source| PersistenceError::Serialize { key, source })
}
