//! Tenant directory: the live namespace of roles and channels

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use crate::errors::{ExError, ExErrorKind, Result};
use crate::model::{Channel, ChannelKind, MemberId, Role, RoleId, TenantId};
use crate::permissions::PermissionOracle;

#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Roles in the tenant, in display order
    async fn roles(&self, tenant: &TenantId) -> Result<Vec<Role>>;

    /// Channels in the tenant, in display order
    async fn channels(&self, tenant: &TenantId) -> Result<Vec<Channel>>;

    async fn role(&self, tenant: &TenantId, id: RoleId) -> Result<Option<Role>> {
        Ok(self.roles(tenant).await?.into_iter().find(|r| r.id == id))
    }

    /// Channels of one kind, order preserved
    async fn channels_of_kind(&self, tenant: &TenantId, kind: ChannelKind) -> Result<Vec<Channel>> {
        Ok(self
            .channels(tenant)
            .await?
            .into_iter()
            .filter(|c| c.kind == kind)
            .collect())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberFixture {
    pub id: MemberId,
    #[serde(default)]
    pub manage: bool,
    #[serde(default)]
    pub roles: Vec<RoleId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TenantFixture {
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub members: Vec<MemberFixture>,
}

/// Directory and permission oracle backed by fixed data
///
/// Used by the console front end (loaded from YAML) and by tests.
///
/// ```yaml
/// tenants:
///   guild-1:
///     roles:
///       - { id: 10, name: StudyRole }
///     channels:
///       - { id: 20, name: study, kind: text }
///     members:
///       - { id: alice, manage: true }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InMemoryDirectory {
    #[serde(default)]
    tenants: HashMap<TenantId, TenantFixture>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tenant(mut self, tenant: TenantId, fixture: TenantFixture) -> Self {
        self.tenants.insert(tenant, fixture);
        self
    }

    fn fixture(&self, tenant: &TenantId) -> Result<&TenantFixture> {
        self.tenants.get(tenant).ok_or_else(|| {
            ExError::new(ExErrorKind::NotFound)
                .with_op("directory_lookup")
                .with_tenant(tenant.as_str())
                .with_message("unknown tenant")
        })
    }

    fn member(&self, tenant: &TenantId, member: &MemberId) -> Result<Option<&MemberFixture>> {
        Ok(self.fixture(tenant)?.members.iter().find(|m| &m.id == member))
    }
}

#[async_trait]
impl TenantDirectory for InMemoryDirectory {
    async fn roles(&self, tenant: &TenantId) -> Result<Vec<Role>> {
        Ok(self.fixture(tenant)?.roles.clone())
    }

    async fn channels(&self, tenant: &TenantId) -> Result<Vec<Channel>> {
        Ok(self.fixture(tenant)?.channels.clone())
    }
}

#[async_trait]
impl PermissionOracle for InMemoryDirectory {
    async fn has_manage_authority(&self, tenant: &TenantId, requester: &MemberId) -> Result<bool> {
        Ok(self.member(tenant, requester)?.is_some_and(|m| m.manage))
    }

    async fn holds_role(
        &self,
        tenant: &TenantId,
        requester: &MemberId,
        role: RoleId,
    ) -> Result<bool> {
        Ok(self
            .member(tenant, requester)?
            .is_some_and(|m| m.roles.contains(&role)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> InMemoryDirectory {
        InMemoryDirectory::new().with_tenant(
            TenantId::new("t1"),
            TenantFixture {
                roles: vec![Role::new(10, "StudyRole")],
                channels: vec![Channel::text(20, "study"), Channel::voice(21, "study-vc")],
                members: vec![
                    MemberFixture {
                        id: MemberId::new("owner"),
                        manage: true,
                        roles: vec![],
                    },
                    MemberFixture {
                        id: MemberId::new("helper"),
                        manage: false,
                        roles: vec![RoleId(10)],
                    },
                ],
            },
        )
    }

    #[tokio::test]
    async fn test_channels_of_kind_filters() {
        let dir = directory();
        let voice = dir
            .channels_of_kind(&TenantId::new("t1"), ChannelKind::Voice)
            .await
            .unwrap();
        assert_eq!(voice.len(), 1);
        assert_eq!(voice[0].name, "study-vc");
    }

    #[tokio::test]
    async fn test_unknown_tenant_is_not_found() {
        let err = directory().roles(&TenantId::new("nope")).await.unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_permissions() {
        let dir = directory();
        let t = TenantId::new("t1");
        assert!(dir.has_manage_authority(&t, &MemberId::new("owner")).await.unwrap());
        assert!(!dir.has_manage_authority(&t, &MemberId::new("helper")).await.unwrap());
        assert!(dir.holds_role(&t, &MemberId::new("helper"), RoleId(10)).await.unwrap());
        assert!(!dir.holds_role(&t, &MemberId::new("stranger"), RoleId(10)).await.unwrap());
    }
}
