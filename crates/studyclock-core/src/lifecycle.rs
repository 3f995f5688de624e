//! Group creation and deletion against the registry
//!
//! `create_from_args` accepts the one-line forms of `newgroup`; `delete`
//! resolves a name query against existing groups. Nothing reaches the
//! registry unless every reference resolved.

use std::time::Instant;

use crate::directory::TenantDirectory;
use crate::errors::{DomainError, ExError, ExErrorKind, Result};
use crate::model::{ChannelKind, GroupDraft, TenantId, TimerGroup};
use crate::registry::GroupRegistry;
use crate::resolver::EntityResolver;
use crate::session::Session;
use crate::settings::BotSettings;
use crate::wizard::{GroupWizard, WizardSeed};
use crate::{log_op_end, log_op_error, log_op_start};

/// Parsed `newgroup` argument string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupArgs {
    /// `name, role, channel, clock channel`
    Direct {
        name: String,
        role: String,
        channel: String,
        clock_channel: String,
    },
    /// Anything else; the wizard asks for what is missing
    Wizard { name: Option<String> },
}

impl GroupArgs {
    /// Split on commas and trim each field.
    ///
    /// Exactly four fields select the direct form. Any other count starts
    /// the wizard, seeded with the first field as the name when non-empty;
    /// the remaining fields are dropped.
    pub fn parse(args: &str) -> Self {
        let fields: Vec<&str> = args.split(',').map(str::trim).collect();
        if let [name, role, channel, clock_channel] = fields.as_slice() {
            return GroupArgs::Direct {
                name: name.to_string(),
                role: role.to_string(),
                channel: channel.to_string(),
                clock_channel: clock_channel.to_string(),
            };
        }
        let name = fields
            .first()
            .filter(|n| !n.is_empty())
            .map(|n| n.to_string());
        GroupArgs::Wizard { name }
    }
}

pub struct GroupLifecycle<'a> {
    directory: &'a dyn TenantDirectory,
    registry: &'a dyn GroupRegistry,
    settings: &'a BotSettings,
}

impl<'a> GroupLifecycle<'a> {
    pub fn new(
        directory: &'a dyn TenantDirectory,
        registry: &'a dyn GroupRegistry,
        settings: &'a BotSettings,
    ) -> Self {
        Self {
            directory,
            registry,
            settings,
        }
    }

    /// Create a group from a `newgroup` argument string.
    ///
    /// # Errors
    ///
    /// `Cancelled`/`TimedOut` from the conversation, `NotFound` when a
    /// direct-form reference matches nothing, `InvalidInput` for an empty
    /// direct-form name, `AlreadyExists` from the registry.
    pub async fn create_from_args(
        &self,
        tenant: &TenantId,
        args: &str,
        session: &dyn Session,
    ) -> Result<TimerGroup> {
        let start = Instant::now();
        log_op_start!("group_create", tenant_id = tenant.as_str());

        let result = self.create_inner(tenant, GroupArgs::parse(args), session).await;

        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(group) => {
                log_op_end!("group_create", duration_ms = duration_ms, group_name = group.name.as_str());
            }
            Err(err) => {
                log_op_error!("group_create", err, duration_ms = duration_ms);
            }
        }
        result
    }

    async fn create_inner(
        &self,
        tenant: &TenantId,
        args: GroupArgs,
        session: &dyn Session,
    ) -> Result<TimerGroup> {
        let draft = match args {
            GroupArgs::Direct {
                name,
                role,
                channel,
                clock_channel,
            } => {
                self.resolve_direct(tenant, session, name, &role, &channel, &clock_channel)
                    .await?
            }
            GroupArgs::Wizard { name } => {
                let seed = WizardSeed {
                    name,
                    ..WizardSeed::default()
                };
                GroupWizard::new(session, self.directory, self.settings)
                    .run(tenant, seed)
                    .await?
            }
        };
        self.registry.create(tenant, &draft).await
    }

    async fn resolve_direct(
        &self,
        tenant: &TenantId,
        session: &dyn Session,
        name: String,
        role: &str,
        channel: &str,
        clock_channel: &str,
    ) -> Result<GroupDraft> {
        if name.is_empty() {
            return Err(ExError::from(DomainError::EmptyGroupName).with_op("group_create"));
        }
        let resolver = EntityResolver::new(session, self.settings);

        let roles = self.directory.roles(tenant).await?;
        let role = resolver.resolve(role, &roles).await?;

        let text_channels = self
            .directory
            .channels_of_kind(tenant, ChannelKind::Text)
            .await?;
        let channel = resolver.resolve(channel, &text_channels).await?;

        let voice_channels = self
            .directory
            .channels_of_kind(tenant, ChannelKind::Voice)
            .await?;
        let clock_channel = resolver.resolve(clock_channel, &voice_channels).await?;

        Ok(GroupDraft {
            name,
            role,
            channel,
            clock_channel: Some(clock_channel),
        })
    }

    /// Delete the group matching `query`, asking when several match.
    ///
    /// # Errors
    ///
    /// `NotFound` when no group matches; `Cancelled`/`TimedOut` from the
    /// selection menu.
    pub async fn delete(
        &self,
        tenant: &TenantId,
        query: &str,
        session: &dyn Session,
    ) -> Result<TimerGroup> {
        let start = Instant::now();
        log_op_start!("group_delete", tenant_id = tenant.as_str());

        let result = self.delete_inner(tenant, query, session).await;

        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(group) => {
                log_op_end!("group_delete", duration_ms = duration_ms, group_name = group.name.as_str());
            }
            Err(err) => {
                log_op_error!("group_delete", err, duration_ms = duration_ms);
            }
        }
        result
    }

    async fn delete_inner(
        &self,
        tenant: &TenantId,
        query: &str,
        session: &dyn Session,
    ) -> Result<TimerGroup> {
        let query = query.trim();
        let matches = self.registry.find_matching(tenant, query).await?;
        if matches.is_empty() {
            return Err(ExError::new(ExErrorKind::NotFound)
                .with_op("group_delete")
                .with_tenant(tenant.as_str())
                .with_entity(query)
                .with_message("No matching groups found!"));
        }
        let group = EntityResolver::new(session, self.settings)
            .select(query, matches)
            .await?;
        self.registry.destroy(&group).await?;
        Ok(group)
    }
}
