//! Store-specific constructors for the core `ExError`

use studyclock_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_entity(migration_id)
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// An applied migration whose SQL no longer matches what was recorded
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration_checksum")
        .with_entity(migration_id)
        .with_message(format!(
            "Checksum mismatch for migration {}: recorded {}, embedded {}",
            migration_id, expected, actual
        ))
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// A stored JSON value that cannot be encoded or decoded
pub fn serde_error(op: &str, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op(op.to_string())
        .with_message(err.to_string())
}

/// Whether `err` is a UNIQUE violation (NOT NULL, CHECK and foreign key
/// failures are not)
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}


/// The shared connection mutex was poisoned by a panicking holder
pub fn lock_poisoned() -> ExError {
    ExError::new(ExErrorKind::Internal)
        .with_op("sqlite")
        .with_message("connection lock poisoned")
}
