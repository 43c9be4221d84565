//! Versioned schema steps for the key-value store.
//!
//! # Invariants
//! - Step versions are strictly increasing, starting at 1.
//! - Pending steps run in one transaction together with the
//!   `PRAGMA user_version` bump; a failed step leaves the schema untouched.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "kv_store",
    sql: include_str!("0001_kv_store.sql"),
}];

/// What `apply_migrations` did to one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub from_version: u32,
    pub to_version: u32,
    /// Names of the steps applied, oldest first. Empty when up to date.
    pub applied: Vec<&'static str>,
}

/// Latest schema version this build can write.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings the connection's schema up to `latest_version()`.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<MigrationOutcome> {
    let from_version = schema_version(conn)?;
    let supported = latest_version();
    if from_version > supported {
        return Err(DbError::SchemaTooNew {
            found: from_version,
            supported,
        });
    }

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > from_version)
        .collect();
    if pending.is_empty() {
        return Ok(MigrationOutcome {
            from_version,
            to_version: from_version,
            applied: Vec::new(),
        });
    }

    let tx = conn.transaction()?;
    for migration in &pending {
        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    let applied: Vec<&'static str> = pending.iter().map(|migration| migration.name).collect();
    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={} steps={}",
        from_version,
        supported,
        applied.join(",")
    );
    Ok(MigrationOutcome {
        from_version,
        to_version: supported,
        applied,
    })
}

/// Reads `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
