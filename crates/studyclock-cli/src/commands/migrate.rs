//! Schema migration command
//!
//! Usage: studyclock migrate --db <PATH>

use clap::Args;
use std::path::PathBuf;

use studyclock_store::{db, migrations};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Path to the SQLite database (created if missing)
    #[arg(long, default_value = ".studyclock/store.db")]
    pub db: PathBuf,
}

/// Execute migrate command
pub fn execute(args: MigrateArgs) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = args.db.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let shared = db::open_shared(&args.db)?;
    let conn = shared.lock().map_err(|_| "database lock poisoned")?;
    for id in migrations::applied_migrations(&conn)? {
        println!("✓ {}", id);
    }
    Ok(())
}
