use std::sync::Arc;

use studyclock_core::config_store::InMemorySettingsBackend;
use studyclock_core::directory::{MemberFixture, TenantFixture};
use studyclock_core::{
    BotSettings, Channel, CommandContext, CommandDispatcher, ConfigStore, InMemoryDirectory,
    InMemoryGroupRegistry, MemberId, PermissionOracle, Role, RoleId, Session, TenantId,
};
use studyclock_core_types::RequestContext;

pub const TENANT: &str = "guild-1";

#[allow(dead_code)]
pub fn tenant() -> TenantId {
    TenantId::new(TENANT)
}

/// Roles, channels and members shared by the scenario tests
///
/// - `#study` and `#general` are unique text channels
/// - `coffee` matches two text channels, `lounge` two voice channels
/// - `study` matches two roles
/// - `owner` has manage authority, `admin` holds Timer Admins (13),
///   `student` holds StudyRole only
pub fn fixture() -> TenantFixture {
    TenantFixture {
        roles: vec![
            Role::new(10, "StudyRole"),
            Role::new(11, "Study Buddies"),
            Role::new(12, "Moderators"),
            Role::new(13, "Timer Admins"),
        ],
        channels: vec![
            Channel::text(20, "study"),
            Channel::voice(21, "study-vc"),
            Channel::text(22, "general"),
            Channel::voice(24, "lounge"),
            Channel::voice(25, "lounge-2"),
            Channel::text(26, "coffee-chat"),
            Channel::text(27, "coffee-corner"),
        ],
        members: vec![
            MemberFixture {
                id: MemberId::new("owner"),
                manage: true,
                roles: vec![],
            },
            MemberFixture {
                id: MemberId::new("admin"),
                manage: false,
                roles: vec![RoleId(13)],
            },
            MemberFixture {
                id: MemberId::new("student"),
                manage: false,
                roles: vec![RoleId(10)],
            },
        ],
    }
}

#[allow(dead_code)]
pub struct Harness {
    pub directory: Arc<InMemoryDirectory>,
    pub registry: Arc<InMemoryGroupRegistry>,
    pub config: Arc<ConfigStore>,
    pub dispatcher: CommandDispatcher,
    pub settings: BotSettings,
}

#[allow(dead_code)]
pub fn harness() -> Harness {
    let directory = Arc::new(InMemoryDirectory::new().with_tenant(tenant(), fixture()));
    let registry = Arc::new(InMemoryGroupRegistry::new());
    let oracle: Arc<dyn PermissionOracle> = directory.clone();
    let config = Arc::new(ConfigStore::new(
        Arc::new(InMemorySettingsBackend::new()),
        oracle.clone(),
    ));
    let settings = BotSettings::default();
    let dispatcher = CommandDispatcher::new(
        directory.clone(),
        registry.clone(),
        oracle,
        config.clone(),
        settings.clone(),
    );
    Harness {
        directory,
        registry,
        config,
        dispatcher,
        settings,
    }
}

#[allow(dead_code)]
pub fn context<'a>(session: &'a dyn Session, member: &str) -> CommandContext<'a> {
    CommandContext {
        request: RequestContext::new(),
        tenant: Some(tenant()),
        requester: MemberId::new(member),
        session,
    }
}
