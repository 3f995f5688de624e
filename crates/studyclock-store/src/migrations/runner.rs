//! Migration runner
//!
//! Each pending migration runs in its own transaction and is recorded with
//! the checksum of its SQL. Re-running verifies recorded checksums.

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::errors::{checksum_mismatch, from_rusqlite, migration_error, Result};
use crate::migrations::checksums::compute_checksum;
use crate::migrations::embedded::get_migrations;

/// Apply all pending migrations to the database
///
/// # Errors
///
/// `Persistence` when a migration fails or an applied migration's checksum
/// no longer matches the embedded SQL.
pub fn apply_migrations(conn: &mut Connection) -> Result<()> {
    create_schema_version_table(conn)?;

    for migration in get_migrations() {
        apply_migration(conn, migration.id, migration.sql)?;
    }

    Ok(())
}

/// Ids of applied migrations, in application order
///
/// # Errors
///
/// `Persistence` when the version table cannot be read.
pub fn applied_migrations(conn: &Connection) -> Result<Vec<String>> {
    create_schema_version_table(conn)?;
    let mut stmt = conn
        .prepare("SELECT migration_id FROM schema_version ORDER BY id")
        .map_err(from_rusqlite)?;
    let ids = stmt
        .query_map([], |row| row.get(0))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<String>, _>>()
        .map_err(from_rusqlite)?;
    Ok(ids)
}

fn create_schema_version_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY,
            migration_id TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL,
            checksum TEXT NOT NULL
        )",
        [],
    )
    .map_err(from_rusqlite)?;
    Ok(())
}

fn apply_migration(conn: &mut Connection, migration_id: &str, sql: &str) -> Result<()> {
    let checksum = compute_checksum(sql);

    let recorded: Option<String> = conn
        .query_row(
            "SELECT checksum FROM schema_version WHERE migration_id = ?1",
            [migration_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)?;

    if let Some(recorded) = recorded {
        if recorded != checksum {
            return Err(checksum_mismatch(migration_id, &recorded, &checksum));
        }
        debug!(migration_id, "migration already applied");
        return Ok(());
    }

    let tx = conn.transaction().map_err(from_rusqlite)?;
    tx.execute_batch(sql)
        .map_err(|e| migration_error(migration_id, &e.to_string()))?;
    tx.execute(
        "INSERT INTO schema_version (migration_id, applied_at, checksum) VALUES (?1, ?2, ?3)",
        rusqlite::params![migration_id, chrono::Utc::now().timestamp(), checksum],
    )
    .map_err(from_rusqlite)?;
    tx.commit().map_err(from_rusqlite)?;

    info!(migration_id, "migration applied");
    Ok(())
}
