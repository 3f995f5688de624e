//! studyclock store - SQLite persistence for the command core
//!
//! Provides:
//! - Connection setup and an embedded, checksummed migrations framework
//! - A `SettingsBackend` for per-tenant settings
//! - A `GroupRegistry` persisting timer groups

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

// Re-export key types
pub use db::SharedConnection;
pub use errors::Result;
pub use repo::{SqliteGroupRegistry, SqliteSettingsBackend};
