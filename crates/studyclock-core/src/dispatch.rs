//! Command dispatch
//!
//! Evaluates a command's guards, runs its handler and turns the outcome into
//! exactly one reply, which is also sent through the session. Failures never
//! leave a partial commit behind: handlers only call the registry or the
//! config store once every input has resolved.

use std::sync::Arc;
use std::time::Instant;

use studyclock_core_types::RequestContext;
use tracing::Instrument;

use crate::commands::{Command, CommandReply};
use crate::config_store::{ConfigStore, SettingKey, SettingValue};
use crate::directory::TenantDirectory;
use crate::errors::{DomainError, ExError, ExErrorKind, Result};
use crate::guards::GuardContext;
use crate::lifecycle::GroupLifecycle;
use crate::logging_facility::command_span;
use crate::model::{MemberId, TenantId};
use crate::permissions::PermissionOracle;
use crate::registry::GroupRegistry;
use crate::resolver::EntityResolver;
use crate::session::Session;
use crate::settings::BotSettings;
use crate::{log_op_end, log_op_error, log_op_start};

/// Who is asking, where, and how to talk back to them
pub struct CommandContext<'a> {
    pub request: RequestContext,
    /// `None` outside a tenant (direct messages)
    pub tenant: Option<TenantId>,
    pub requester: MemberId,
    pub session: &'a dyn Session,
}

pub struct CommandDispatcher {
    directory: Arc<dyn TenantDirectory>,
    registry: Arc<dyn GroupRegistry>,
    oracle: Arc<dyn PermissionOracle>,
    config: Arc<ConfigStore>,
    settings: BotSettings,
}

impl CommandDispatcher {
    pub fn new(
        directory: Arc<dyn TenantDirectory>,
        registry: Arc<dyn GroupRegistry>,
        oracle: Arc<dyn PermissionOracle>,
        config: Arc<ConfigStore>,
        settings: BotSettings,
    ) -> Self {
        Self {
            directory,
            registry,
            oracle,
            config,
            settings,
        }
    }

    /// Parse and dispatch one input line.
    ///
    /// # Errors
    ///
    /// Only `Transport`, when the reply cannot be delivered.
    pub async fn dispatch_line(&self, ctx: &CommandContext<'_>, line: &str) -> Result<CommandReply> {
        match Command::parse(line) {
            Ok(command) => self.dispatch(ctx, command).await,
            Err(err) => {
                let reply = CommandReply::error(err.message());
                ctx.session.send(&reply.text).await?;
                Ok(reply)
            }
        }
    }

    /// Run `command` and send its single reply.
    ///
    /// # Errors
    ///
    /// Only `Transport`, when the reply cannot be delivered.
    pub async fn dispatch(&self, ctx: &CommandContext<'_>, command: Command) -> Result<CommandReply> {
        let span = command_span(
            command.name(),
            &ctx.request,
            ctx.tenant.as_ref().map(|t| t.as_str()),
        );
        async {
            let start = Instant::now();
            log_op_start!("dispatch", member_id = ctx.requester.as_str());

            let result = self.run(ctx, &command).await;
            let duration_ms = start.elapsed().as_millis() as u64;
            let reply = match result {
                Ok(reply) => {
                    log_op_end!("dispatch", duration_ms = duration_ms);
                    reply
                }
                Err(err) => {
                    let err = err.with_request_id(ctx.request.request_id.clone());
                    log_op_error!("dispatch", &err, duration_ms = duration_ms);
                    CommandReply::error(failure_text(&command, &err))
                }
            };

            ctx.session.send(&reply.text).await?;
            Ok::<_, ExError>(reply)
        }
        .instrument(span)
        .await
    }

    async fn run(&self, ctx: &CommandContext<'_>, command: &Command) -> Result<CommandReply> {
        let admin_role = ctx
            .tenant
            .as_ref()
            .and_then(|tenant| self.config.timer_admin(tenant));
        let guard_ctx = GuardContext {
            tenant: ctx.tenant.as_ref(),
            requester: &ctx.requester,
            oracle: self.oracle.as_ref(),
            registry: Some(self.registry.as_ref()),
            admin_role,
        };
        command.guards().evaluate(&guard_ctx).await?;

        let tenant = ctx.tenant.as_ref().ok_or_else(|| {
            ExError::new(ExErrorKind::GuardDenied).with_message("This command needs a server.")
        })?;
        let lifecycle = GroupLifecycle::new(
            self.directory.as_ref(),
            self.registry.as_ref(),
            &self.settings,
        );

        match command {
            Command::NewGroup { args } => {
                let group = lifecycle.create_from_args(tenant, args, ctx.session).await?;
                Ok(CommandReply::success(format!(
                    "Group **{}** has been created and bound to channel {}.",
                    group.name,
                    group.channel.mention()
                )))
            }
            Command::DelGroup { query } => {
                let group = lifecycle.delete(tenant, query, ctx.session).await?;
                Ok(CommandReply::success(format!(
                    "The group `{}` has been removed!",
                    group.name
                )))
            }
            Command::AdminRole { role: None } => self.show_admin_role(tenant).await,
            Command::AdminRole { role: Some(query) } => {
                self.set_admin_role(ctx, tenant, query).await
            }
            Command::GlobalGroups { option: None } => Ok(CommandReply::info(
                if self.config.global_groups(tenant) {
                    "Groups may be joined from any guild channel."
                } else {
                    "Groups may only be joined from their associated channel."
                },
            )),
            Command::GlobalGroups {
                option: Some(option),
            } => self.set_global_groups(ctx, tenant, option).await,
        }
    }

    async fn show_admin_role(&self, tenant: &TenantId) -> Result<CommandReply> {
        let Some(role_id) = self.config.timer_admin(tenant) else {
            return Ok(CommandReply::info("No timer admin role set for this guild."));
        };
        Ok(match self.directory.role(tenant, role_id).await? {
            Some(role) => CommandReply::info(format!("Timer admin role is {}.", role.id.mention())),
            None => CommandReply::info(format!(
                "Timer admin role set to a nonexistent role `{}`.",
                role_id
            )),
        })
    }

    async fn set_admin_role(
        &self,
        ctx: &CommandContext<'_>,
        tenant: &TenantId,
        query: &str,
    ) -> Result<CommandReply> {
        self.config
            .authorize_write(tenant, SettingKey::TimerAdmin, &ctx.requester)
            .await
            .map_err(|err| {
                reword_denial(
                    err,
                    "You need the `manage_guild` permission to change the timer admin role.",
                )
            })?;

        let roles = self.directory.roles(tenant).await?;
        let role = EntityResolver::new(ctx.session, &self.settings)
            .resolve(query, &roles)
            .await?;
        self.config
            .set(tenant, SettingKey::TimerAdmin, SettingValue::Role(role.id), &ctx.requester)
            .await?;
        Ok(CommandReply::success(format!(
            "Timer admin role set to {}.",
            role.id.mention()
        )))
    }

    async fn set_global_groups(
        &self,
        ctx: &CommandContext<'_>,
        tenant: &TenantId,
        option: &str,
    ) -> Result<CommandReply> {
        self.config
            .authorize_write(tenant, SettingKey::GlobalGroups, &ctx.requester)
            .await
            .map_err(|err| {
                reword_denial(err, "You need the timeradmin role to configure this setting!")
            })?;

        let (flag, text) = match option.trim().to_ascii_lowercase().as_str() {
            "on" => (true, "Groups may now be joined from any guild channel."),
            "off" => (false, "Groups may now only be joined from their associated channel."),
            _ => {
                return Err(DomainError::UnknownOption {
                    option: option.to_string(),
                }
                .into())
            }
        };
        self.config
            .set(tenant, SettingKey::GlobalGroups, SettingValue::Flag(flag), &ctx.requester)
            .await?;
        Ok(CommandReply::success(text))
    }
}

fn reword_denial(err: ExError, text: &str) -> ExError {
    if err.kind() == ExErrorKind::PermissionDenied {
        err.with_message(text)
    } else {
        err
    }
}

/// The one user-facing message for a failed command
fn failure_text(command: &Command, err: &ExError) -> String {
    let kind = err.kind();
    let detail = |fallback: &str| {
        if err.message().is_empty() {
            fallback.to_string()
        } else {
            err.message().to_string()
        }
    };

    match (command, kind) {
        (_, ExErrorKind::PermissionDenied | ExErrorKind::GuardDenied) => {
            detail("You are not allowed to do that.")
        }
        (Command::NewGroup { .. }, ExErrorKind::Cancelled) => {
            "User cancelled during group creation! No group was created.".to_string()
        }
        (Command::NewGroup { .. }, ExErrorKind::TimedOut) => {
            "Timed out waiting for a response during group creation! No group was created."
                .to_string()
        }
        (
            Command::NewGroup { .. },
            ExErrorKind::NotFound | ExErrorKind::InvalidInput | ExErrorKind::AlreadyExists,
        ) => format!("{} No group was created.", detail("Invalid group details.")),
        (Command::DelGroup { .. }, ExErrorKind::Cancelled) => {
            "User cancelled group selection. No groups were deleted.".to_string()
        }
        (Command::DelGroup { .. }, ExErrorKind::TimedOut) => {
            "Group selection timed out. No groups were deleted.".to_string()
        }
        (Command::DelGroup { .. }, ExErrorKind::NotFound) => {
            detail("No matching groups found!")
        }
        (Command::AdminRole { .. }, ExErrorKind::Cancelled) => {
            "User cancelled role selection. Timer admin role unchanged.".to_string()
        }
        (Command::AdminRole { .. }, ExErrorKind::TimedOut) => {
            "Role selection timed out. Timer admin role unchanged.".to_string()
        }
        (Command::AdminRole { .. }, ExErrorKind::NotFound) => {
            format!("{} Timer admin role unchanged.", detail("No such role."))
        }
        (Command::GlobalGroups { .. }, ExErrorKind::InvalidInput) => {
            detail("Unrecognised option.")
        }
        _ => format!(
            "Something went wrong while running `{}` ({}). Please try again later.",
            command.name(),
            err.code()
        ),
    }
}
