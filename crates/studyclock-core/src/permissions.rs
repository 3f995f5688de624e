//! Authorization seam

use async_trait::async_trait;

use crate::errors::Result;
use crate::model::{MemberId, RoleId, TenantId};

/// Answers authorization questions against the platform's permission model
#[async_trait]
pub trait PermissionOracle: Send + Sync {
    /// Whether `requester` may manage the tenant's configuration
    async fn has_manage_authority(&self, tenant: &TenantId, requester: &MemberId) -> Result<bool>;

    /// Whether `requester` currently holds `role` in the tenant
    async fn holds_role(&self, tenant: &TenantId, requester: &MemberId, role: RoleId)
        -> Result<bool>;
}
