//! Interactive group creation
//!
//! The wizard walks `Name -> Role -> Channel -> ClockChannel -> Done`, one
//! prompt loop per step. Cancel and timeout abort the whole conversation and
//! nothing is committed; the caller commits the returned draft.

use std::time::Instant;

use crate::directory::TenantDirectory;
use crate::errors::{ExError, ExErrorKind, Result};
use crate::model::{Channel, ChannelKind, GroupDraft, NamedObject, Role, TenantId};
use crate::prompt::{PromptLoop, SKIP_TOKEN};
use crate::resolver::EntityResolver;
use crate::session::Session;
use crate::settings::BotSettings;
use crate::{log_op_end, log_op_error, log_op_start};

pub const NAME_PROMPT: &str = "Please enter a friendly name for the new study group:";

pub const ROLE_PROMPT: &str = "Please enter the study group role.\n\
    Members who join the group receive this role, and it is mentioned for notifications. \
    I need permission to mention it and to assign it, so it must sit below my highest role.\n\
    (Accepted input: role name or partial name, role id, role mention, or `c` to cancel.)";

pub const CHANNEL_PROMPT: &str = "Please enter the text channel to bind the group to.\n\
    Group commands only work from this channel, and it hosts the pinned status message. \
    I need the `MANAGE_MESSAGES` permission there to pin it.\n\
    (Accepted input: channel name or partial name, channel id, channel mention, or `c` to cancel.)";

pub const CLOCK_CHANNEL_PROMPT: &str = "Please enter the group voice channel, \
    or `s` to continue without one.\n\
    Its name shows the current stage and time remaining, and members who join it are \
    subscribed to the group automatically. I need the `MANAGE_CHANNEL` permission there.\n\
    (Accepted input: channel name or partial name, channel id, channel mention, \
    `s` to skip, or `c` to cancel.)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Name,
    Role,
    Channel,
    ClockChannel,
    Done,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ClockChannelSlot {
    #[default]
    Pending,
    Bound(Channel),
    /// The operator chose to go without a voice channel
    Skipped,
}

/// Answers collected so far by one wizard run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardState {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub text_channel: Option<Channel>,
    pub clock_channel: ClockChannelSlot,
}

impl WizardState {
    /// The first step still missing an answer
    pub fn step(&self) -> WizardStep {
        if self.name.is_none() {
            WizardStep::Name
        } else if self.role.is_none() {
            WizardStep::Role
        } else if self.text_channel.is_none() {
            WizardStep::Channel
        } else if self.clock_channel == ClockChannelSlot::Pending {
            WizardStep::ClockChannel
        } else {
            WizardStep::Done
        }
    }

    /// # Errors
    ///
    /// `Internal` if called before every step is answered.
    pub fn into_draft(self) -> Result<GroupDraft> {
        let incomplete = || {
            ExError::new(ExErrorKind::Internal)
                .with_op("group_wizard")
                .with_message("wizard finished with missing fields")
        };
        let clock_channel = match self.clock_channel {
            ClockChannelSlot::Bound(channel) => Some(channel),
            ClockChannelSlot::Skipped => None,
            ClockChannelSlot::Pending => return Err(incomplete()),
        };
        Ok(GroupDraft {
            name: self.name.ok_or_else(incomplete)?,
            role: self.role.ok_or_else(incomplete)?,
            channel: self.text_channel.ok_or_else(incomplete)?,
            clock_channel,
        })
    }
}

/// Raw answers supplied with the command, used instead of prompting
///
/// Seeded references still go through the resolver, so an ambiguous seed
/// opens the selection menu. A seed that matches nothing is reported and
/// the step falls back to its prompt.
#[derive(Debug, Clone, Default)]
pub struct WizardSeed {
    pub name: Option<String>,
    pub role: Option<String>,
    pub channel: Option<String>,
    pub clock_channel: Option<String>,
}

pub struct GroupWizard<'a> {
    session: &'a dyn Session,
    directory: &'a dyn TenantDirectory,
    settings: &'a BotSettings,
}

impl<'a> GroupWizard<'a> {
    pub fn new(
        session: &'a dyn Session,
        directory: &'a dyn TenantDirectory,
        settings: &'a BotSettings,
    ) -> Self {
        Self {
            session,
            directory,
            settings,
        }
    }

    /// Collect a complete group draft for `tenant`.
    ///
    /// # Errors
    ///
    /// `Cancelled` or `TimedOut` from any step, or a directory failure.
    pub async fn run(&self, tenant: &TenantId, seed: WizardSeed) -> Result<GroupDraft> {
        let start = Instant::now();
        log_op_start!("group_wizard", tenant_id = tenant.as_str());

        let result = self
            .drive(tenant, seed)
            .await
            .map_err(|err| err.with_tenant(tenant.as_str()));

        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(draft) => {
                log_op_end!("group_wizard", duration_ms = duration_ms, group_name = draft.name.as_str());
            }
            Err(err) => {
                log_op_error!("group_wizard", err, duration_ms = duration_ms);
            }
        }
        result
    }

    async fn drive(&self, tenant: &TenantId, mut seed: WizardSeed) -> Result<GroupDraft> {
        let resolver = EntityResolver::new(self.session, self.settings);
        let mut state = WizardState::default();

        loop {
            let step = state.step();
            tracing::debug!(wizard_step = ?step, "wizard step");
            match step {
                WizardStep::Name => {
                    let seeded = seed
                        .name
                        .take()
                        .map(|n| n.trim().to_string())
                        .filter(|n| !n.is_empty());
                    let name = match seeded {
                        Some(name) => name,
                        None => PromptLoop::new(self.session, self.settings.prompt_timeout())
                            .ask(NAME_PROMPT, |reply| async move { Ok(reply) })
                            .await?
                            .into_option()
                            .ok_or_else(|| ExError::new(ExErrorKind::Internal))?,
                    };
                    state.name = Some(name);
                }
                WizardStep::Role => {
                    let roles = self.directory.roles(tenant).await?;
                    let role = self
                        .resolve_step(&resolver, seed.role.take(), ROLE_PROMPT, &roles, false)
                        .await?;
                    state.role = role;
                }
                WizardStep::Channel => {
                    let channels = self
                        .directory
                        .channels_of_kind(tenant, ChannelKind::Text)
                        .await?;
                    let channel = self
                        .resolve_step(&resolver, seed.channel.take(), CHANNEL_PROMPT, &channels, false)
                        .await?;
                    state.text_channel = channel;
                }
                WizardStep::ClockChannel => {
                    let channels = self
                        .directory
                        .channels_of_kind(tenant, ChannelKind::Voice)
                        .await?;
                    let clock = self
                        .resolve_step(
                            &resolver,
                            seed.clock_channel.take(),
                            CLOCK_CHANNEL_PROMPT,
                            &channels,
                            true,
                        )
                        .await?;
                    state.clock_channel = match clock {
                        Some(channel) => ClockChannelSlot::Bound(channel),
                        None => ClockChannelSlot::Skipped,
                    };
                }
                WizardStep::Done => return state.into_draft(),
            }
        }
    }

    /// Resolve one reference, from the seed if present, else by prompting.
    /// `None` only when `skippable` and the operator skipped.
    async fn resolve_step<T>(
        &self,
        resolver: &EntityResolver<'_>,
        seed: Option<String>,
        prompt: &str,
        candidates: &[T],
        skippable: bool,
    ) -> Result<Option<T>>
    where
        T: NamedObject + Clone + Send + Sync,
    {
        if let Some(raw) = seed.filter(|s| !s.trim().is_empty()) {
            if skippable && raw.trim().eq_ignore_ascii_case(SKIP_TOKEN) {
                return Ok(None);
            }
            match resolver.resolve(&raw, candidates).await {
                Ok(value) => return Ok(Some(value)),
                Err(err) if err.kind().is_recoverable() => {
                    self.session.send(err.message()).await?;
                }
                Err(err) => return Err(err),
            }
        }

        let mut prompt_loop = PromptLoop::new(self.session, self.settings.prompt_timeout());
        if skippable {
            prompt_loop = prompt_loop.with_skip_token(SKIP_TOKEN);
        }
        let outcome = prompt_loop
            .ask(prompt, |reply| async move {
                resolver.resolve(&reply, candidates).await
            })
            .await?;
        Ok(outcome.into_option())
    }
}
