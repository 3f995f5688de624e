//! Interactive console command
//!
//! Usage: studyclock console --directory <YAML> [--db <PATH>] [--tenant <ID>] --member <ID>
//!
//! Each stdin line is one command (`newgroup ...`, `delgroup ...`,
//! `adminrole ...`, `globalgroups ...`). `quit` or end of input stops.

use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use studyclock_core::logging_facility;
use studyclock_core::{
    CommandContext, CommandDispatcher, ConfigStore, InMemoryDirectory, MemberId, TenantId,
};
use studyclock_core_types::{RequestContext, TraceId};
use studyclock_store::{db, SqliteGroupRegistry, SqliteSettingsBackend};
use tracing::info;

use crate::settings;
use crate::stdio_session::StdioSession;

#[derive(Debug, Args)]
pub struct ConsoleArgs {
    /// YAML file describing tenants, their roles, channels and members
    #[arg(long)]
    pub directory: PathBuf,

    /// Path to the SQLite database (created and migrated if missing)
    #[arg(long, default_value = ".studyclock/store.db")]
    pub db: PathBuf,

    /// Tenant the commands run in; omit to act as a direct message
    #[arg(long)]
    pub tenant: Option<String>,

    /// Member issuing the commands
    #[arg(long)]
    pub member: String,

    /// Optional settings file (YAML, TOML or JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Execute console command
pub async fn execute(args: ConsoleArgs) -> Result<(), Box<dyn std::error::Error>> {
    let bot_settings = settings::load(args.config.as_deref())?;
    bot_settings.validate()?;
    logging_facility::init(bot_settings.log_profile);

    let directory: InMemoryDirectory =
        serde_yaml::from_str(&std::fs::read_to_string(&args.directory)?)?;
    let directory = Arc::new(directory);

    if let Some(parent) = args.db.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let conn = db::open_shared(&args.db)?;

    let config = Arc::new(ConfigStore::new(
        Arc::new(SqliteSettingsBackend::new(Arc::clone(&conn))),
        directory.clone(),
    ));
    let dispatcher = CommandDispatcher::new(
        directory.clone(),
        Arc::new(SqliteGroupRegistry::new(conn)),
        directory,
        config,
        bot_settings,
    );

    let session = StdioSession::stdio();
    let tenant = args.tenant.map(TenantId::new);
    let requester = MemberId::new(args.member);
    info!(tenant_id = ?tenant, member_id = %requester, "console ready");

    let mut command_no = 0u64;
    while let Some(line) = session.next_line().await? {
        command_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") {
            break;
        }

        let ctx = CommandContext {
            request: RequestContext::new()
                .with_trace_id(TraceId::from_string(format!("console:{command_no}"))),
            tenant: tenant.clone(),
            requester: requester.clone(),
            session: &session,
        };
        dispatcher.dispatch_line(&ctx, line).await?;
    }

    Ok(())
}
