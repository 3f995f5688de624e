//! studyclock core - interactive configuration commands for study timer groups
//!
//! This crate holds everything between a parsed command line and the
//! external collaborators:
//! - Entity resolution of free-text replies against the tenant directory
//! - The prompt loop (retry, cancel, skip, timeout) and the group wizard
//! - Group creation/deletion against a `GroupRegistry`
//! - Per-tenant settings behind a permission gate
//! - Command guards, parsing and dispatch to a single reply
//!
//! Transport (`Session`), directory, permissions and persistence are traits;
//! in-memory implementations are provided for tests and the console.

pub mod commands;
pub mod config_store;
pub mod directory;
pub mod dispatch;
pub mod errors;
pub mod guards;
pub mod lifecycle;
pub mod logging_facility;
pub mod model;
pub mod permissions;
pub mod prompt;
pub mod registry;
pub mod resolver;
pub mod session;
pub mod settings;
pub mod wizard;

// Re-export commonly used types
pub use commands::{Command, CommandReply, ReplyKind};
pub use config_store::{ConfigStore, SettingKey, SettingValue, SettingsBackend};
pub use directory::{InMemoryDirectory, TenantDirectory};
pub use dispatch::{CommandContext, CommandDispatcher};
pub use errors::{DomainError, ExError, ExErrorKind, Result};
pub use model::{Channel, ChannelKind, GroupDraft, MemberId, Role, RoleId, TenantId, TimerGroup};
pub use permissions::PermissionOracle;
pub use registry::{GroupRegistry, InMemoryGroupRegistry};
pub use session::{ScriptedSession, Session};
pub use settings::BotSettings;
