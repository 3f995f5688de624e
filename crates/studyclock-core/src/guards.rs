//! Command preconditions as an explicit, ordered chain
//!
//! Each guard inspects a `GuardContext` and passes or denies with a reason.
//! A chain stops at the first denial.

use async_trait::async_trait;

use crate::errors::{ExError, ExErrorKind, Result};
use crate::model::{MemberId, RoleId, TenantId};
use crate::permissions::PermissionOracle;
use crate::registry::GroupRegistry;

/// What guards may look at
pub struct GuardContext<'a> {
    pub tenant: Option<&'a TenantId>,
    pub requester: &'a MemberId,
    pub oracle: &'a dyn PermissionOracle,
    pub registry: Option<&'a dyn GroupRegistry>,
    /// Currently configured timer admin role, if any
    pub admin_role: Option<RoleId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardVerdict {
    Pass,
    Deny { reason: String },
}

impl GuardVerdict {
    pub fn deny(reason: impl Into<String>) -> Self {
        GuardVerdict::Deny {
            reason: reason.into(),
        }
    }
}

#[async_trait]
pub trait Guard: Send + Sync {
    fn name(&self) -> &'static str;

    /// # Errors
    ///
    /// Only when a collaborator fails; a denial is a verdict, not an error.
    async fn check(&self, ctx: &GuardContext<'_>) -> Result<GuardVerdict>;

    /// Error kind reported when this guard denies
    fn denial_kind(&self) -> ExErrorKind {
        ExErrorKind::GuardDenied
    }
}

fn require_tenant<'a>(ctx: &GuardContext<'a>) -> Result<&'a TenantId> {
    ctx.tenant.ok_or_else(|| {
        ExError::new(ExErrorKind::GuardDenied)
            .with_op("guard")
            .with_message("This command can only be used inside a server.")
    })
}

/// The command must run inside a tenant
pub struct RequireTenant;

#[async_trait]
impl Guard for RequireTenant {
    fn name(&self) -> &'static str {
        "require_tenant"
    }

    async fn check(&self, ctx: &GuardContext<'_>) -> Result<GuardVerdict> {
        Ok(match ctx.tenant {
            Some(_) => GuardVerdict::Pass,
            None => GuardVerdict::deny("This command can only be used inside a server."),
        })
    }
}

/// The group registry must have finished loading
pub struct RequireRegistryReady;

#[async_trait]
impl Guard for RequireRegistryReady {
    fn name(&self) -> &'static str {
        "require_registry_ready"
    }

    async fn check(&self, ctx: &GuardContext<'_>) -> Result<GuardVerdict> {
        let ready = match ctx.registry {
            Some(registry) => registry.is_ready().await,
            None => false,
        };
        Ok(if ready {
            GuardVerdict::Pass
        } else {
            GuardVerdict::deny("The timer registry is still loading. Please try again shortly.")
        })
    }
}

/// Manage authority, or the configured timer admin role
pub struct RequireTimerAdmin;

#[async_trait]
impl Guard for RequireTimerAdmin {
    fn name(&self) -> &'static str {
        "require_timer_admin"
    }

    async fn check(&self, ctx: &GuardContext<'_>) -> Result<GuardVerdict> {
        let tenant = require_tenant(ctx)?;
        if ctx.oracle.has_manage_authority(tenant, ctx.requester).await? {
            return Ok(GuardVerdict::Pass);
        }
        if let Some(role) = ctx.admin_role {
            if ctx.oracle.holds_role(tenant, ctx.requester, role).await? {
                return Ok(GuardVerdict::Pass);
            }
        }
        Ok(GuardVerdict::deny(
            "You need the timer admin role to use this command!",
        ))
    }

    fn denial_kind(&self) -> ExErrorKind {
        ExErrorKind::PermissionDenied
    }
}

/// Tenant-level manage authority only
pub struct RequireManageAuthority;

#[async_trait]
impl Guard for RequireManageAuthority {
    fn name(&self) -> &'static str {
        "require_manage_authority"
    }

    async fn check(&self, ctx: &GuardContext<'_>) -> Result<GuardVerdict> {
        let tenant = require_tenant(ctx)?;
        Ok(
            if ctx.oracle.has_manage_authority(tenant, ctx.requester).await? {
                GuardVerdict::Pass
            } else {
                GuardVerdict::deny("You need the `manage_guild` permission to do this.")
            },
        )
    }

    fn denial_kind(&self) -> ExErrorKind {
        ExErrorKind::PermissionDenied
    }
}

/// Guards evaluated in order; the first denial wins
#[derive(Default)]
pub struct GuardChain {
    guards: Vec<Box<dyn Guard>>,
}

impl GuardChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, guard: impl Guard + 'static) -> Self {
        self.guards.push(Box::new(guard));
        self
    }

    /// Tenant scope, registry ready, timer admin
    pub fn group_management() -> Self {
        Self::new()
            .with(RequireTenant)
            .with(RequireRegistryReady)
            .with(RequireTimerAdmin)
    }

    pub fn tenant_only() -> Self {
        Self::new().with(RequireTenant)
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// Run every guard until one denies.
    ///
    /// # Errors
    ///
    /// The first denial as an error of the guard's `denial_kind`, with the
    /// guard's reason as message; or a collaborator failure.
    pub async fn evaluate(&self, ctx: &GuardContext<'_>) -> Result<()> {
        for guard in &self.guards {
            match guard.check(ctx).await? {
                GuardVerdict::Pass => {
                    tracing::trace!(guard = guard.name(), "guard passed");
                }
                GuardVerdict::Deny { reason } => {
                    tracing::warn!(
                        guard = guard.name(),
                        member_id = ctx.requester.as_str(),
                        tenant_id = ctx.tenant.map(|t| t.as_str()).unwrap_or(""),
                        "guard denied"
                    );
                    let mut err = ExError::new(guard.denial_kind())
                        .with_op(guard.name())
                        .with_message(reason);
                    if let Some(tenant) = ctx.tenant {
                        err = err.with_tenant(tenant.as_str());
                    }
                    return Err(err);
                }
            }
        }
        Ok(())
    }
}
