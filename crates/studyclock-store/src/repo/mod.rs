//! SQLite implementations of the command core's storage seams

mod group_repo;
mod settings_repo;

pub use group_repo::SqliteGroupRegistry;
pub use settings_repo::SqliteSettingsBackend;
