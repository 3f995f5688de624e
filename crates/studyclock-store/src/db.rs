//! Database connection management

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::errors::{from_rusqlite, Result};
use crate::migrations::apply_migrations;

/// One connection shared by the settings backend and the group registry
pub type SharedConnection = Arc<Mutex<Connection>>;

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(from_rusqlite)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Enable foreign keys and WAL journaling
pub fn configure(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(from_rusqlite)?;
    // In-memory databases answer "memory" and keep working.
    let mode: String = conn
        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
        .map_err(from_rusqlite)?;
    tracing::debug!(journal_mode = %mode, "database configured");
    Ok(())
}

/// Open, configure and migrate a database, ready for sharing
pub fn open_shared<P: AsRef<Path>>(path: P) -> Result<SharedConnection> {
    let mut conn = open(path)?;
    configure(&conn)?;
    apply_migrations(&mut conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// In-memory counterpart of `open_shared`
pub fn open_shared_in_memory() -> Result<SharedConnection> {
    let mut conn = open_in_memory()?;
    configure(&conn)?;
    apply_migrations(&mut conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}
