//! Timer group registry seam

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::{DomainError, ExError, ExErrorKind, Result};
use crate::model::{GroupDraft, TenantId, TimerGroup};

#[async_trait]
pub trait GroupRegistry: Send + Sync {
    /// Whether the registry has finished loading and can take commands
    async fn is_ready(&self) -> bool {
        true
    }

    /// Persist a new group.
    ///
    /// # Errors
    ///
    /// `AlreadyExists` when the tenant has a group of the same name
    /// (case-insensitive), `Persistence` on storage failures.
    async fn create(&self, tenant: &TenantId, draft: &GroupDraft) -> Result<TimerGroup>;

    /// Remove a group.
    ///
    /// # Errors
    ///
    /// `NotFound` when the group no longer exists.
    async fn destroy(&self, group: &TimerGroup) -> Result<()>;

    /// Groups of `tenant` matching `query`, ordered by creation.
    ///
    /// An exact (case-insensitive) name match is returned alone. Otherwise
    /// every group whose name contains the query is returned; an empty query
    /// matches every group.
    async fn find_matching(&self, tenant: &TenantId, query: &str) -> Result<Vec<TimerGroup>>;
}

/// Case-folded form of a group name, used for both uniqueness and matching
pub fn fold_group_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Apply the name-matching rule shared by registry implementations
///
/// Every exact match is returned, so names that only fold together still
/// reach the selection menu instead of the first one winning.
pub fn filter_groups(groups: Vec<TimerGroup>, query: &str) -> Vec<TimerGroup> {
    let query = fold_group_name(query);
    if query.is_empty() {
        return groups;
    }
    let (exact, rest): (Vec<_>, Vec<_>) = groups
        .into_iter()
        .partition(|g| fold_group_name(&g.name) == query);
    if !exact.is_empty() {
        return exact;
    }
    rest.into_iter()
        .filter(|g| fold_group_name(&g.name).contains(&query))
        .collect()
}

/// Registry kept in process memory
#[derive(Default)]
pub struct InMemoryGroupRegistry {
    groups: Mutex<BTreeMap<TenantId, Vec<TimerGroup>>>,
}

impl InMemoryGroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All groups of a tenant, in creation order
    pub fn groups(&self, tenant: &TenantId) -> Vec<TimerGroup> {
        self.groups
            .lock()
            .ok()
            .and_then(|g| g.get(tenant).cloned())
            .unwrap_or_default()
    }

    fn poisoned() -> ExError {
        ExError::new(ExErrorKind::Internal).with_message("group registry lock poisoned")
    }
}

#[async_trait]
impl GroupRegistry for InMemoryGroupRegistry {
    async fn create(&self, tenant: &TenantId, draft: &GroupDraft) -> Result<TimerGroup> {
        let mut groups = self.groups.lock().map_err(|_| Self::poisoned())?;
        let entry = groups.entry(tenant.clone()).or_default();
        let folded = fold_group_name(&draft.name);
        if entry.iter().any(|g| fold_group_name(&g.name) == folded) {
            return Err(ExError::from(DomainError::GroupNameTaken {
                name: draft.name.clone(),
            })
            .with_op("group_create")
            .with_tenant(tenant.as_str()));
        }
        let group = draft.clone().into_group(tenant.clone());
        entry.push(group.clone());
        Ok(group)
    }

    async fn destroy(&self, group: &TimerGroup) -> Result<()> {
        let mut groups = self.groups.lock().map_err(|_| Self::poisoned())?;
        let entry = groups.entry(group.tenant.clone()).or_default();
        let before = entry.len();
        entry.retain(|g| g.name != group.name);
        if entry.len() == before {
            return Err(ExError::new(ExErrorKind::NotFound)
                .with_op("group_destroy")
                .with_tenant(group.tenant.as_str())
                .with_entity(group.name.clone()));
        }
        Ok(())
    }

    async fn find_matching(&self, tenant: &TenantId, query: &str) -> Result<Vec<TimerGroup>> {
        Ok(filter_groups(self.groups(tenant), query))
    }
}
