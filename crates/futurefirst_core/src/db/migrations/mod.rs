//! Key-value schema migrations.
//!
//! # Invariants
//! - Versions are strictly increasing and never renumbered.
//! - Every applied version is mirrored to `PRAGMA user_version` inside the
//!   same transaction as its SQL.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// (version, sql) pairs in apply order.
const MIGRATIONS: &[(u32, &str)] = &[(1, include_str!("0001_kv_store.sql"))];

/// Returns the newest schema version this build understands.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |(version, _)| *version)
}

/// Reads the schema version recorded in the database.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

/// Applies every migration newer than the recorded version.
///
/// Returns the number of migrations applied (0 when already current).
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let found = schema_version(conn)?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::UnsupportedSchemaVersion { found, supported });
    }

    let pending: Vec<_> = MIGRATIONS
        .iter()
        .filter(|(version, _)| *version > found)
        .collect();
    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for (version, sql) in &pending {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", *version)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={} applied={}",
        found,
        supported,
        pending.len()
    );
    Ok(pending.len())
}
