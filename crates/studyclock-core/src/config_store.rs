//! Per-tenant settings with typed accessors and a permission gate on writes
//!
//! Reads never fail: an unset, unreadable or mistyped value yields the
//! documented default. Writes for one tenant are serialized and authorized
//! before anything is stored:
//!
//! - `timeradmin` requires manage authority
//! - `globalgroups` accepts manage authority or the current timer admin role

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde_json::Value;

use crate::errors::{DomainError, ExError, ExErrorKind, Result};
use crate::guards::{GuardChain, GuardContext, RequireManageAuthority, RequireTimerAdmin};
use crate::model::{MemberId, RoleId, TenantId};
use crate::permissions::PermissionOracle;
use crate::{log_op_end, log_op_error, log_op_start};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    /// Role allowed to manage timer groups
    TimerAdmin,
    /// Whether groups may be joined away from their bound channel
    GlobalGroups,
}

impl SettingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::TimerAdmin => "timeradmin",
            SettingKey::GlobalGroups => "globalgroups",
        }
    }

    fn default_value(&self) -> SettingValue {
        match self {
            SettingKey::TimerAdmin => SettingValue::Absent,
            SettingKey::GlobalGroups => SettingValue::Flag(false),
        }
    }

    fn decode(&self, raw: Value) -> Option<SettingValue> {
        match (self, raw) {
            (_, Value::Null) => Some(SettingValue::Absent),
            (SettingKey::TimerAdmin, Value::Number(n)) => {
                n.as_u64().map(|id| SettingValue::Role(RoleId(id)))
            }
            (SettingKey::GlobalGroups, Value::Bool(b)) => Some(SettingValue::Flag(b)),
            _ => None,
        }
    }

    fn accepts(&self, value: &SettingValue) -> bool {
        matches!(
            (self, value),
            (_, SettingValue::Absent)
                | (SettingKey::TimerAdmin, SettingValue::Role(_))
                | (SettingKey::GlobalGroups, SettingValue::Flag(_))
        )
    }

    fn expected(&self) -> &'static str {
        match self {
            SettingKey::TimerAdmin => "a role id",
            SettingKey::GlobalGroups => "on or off",
        }
    }
}

impl std::fmt::Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingValue {
    Role(RoleId),
    Flag(bool),
    /// Unset; reading it yields the key's default
    Absent,
}

impl SettingValue {
    fn to_json(self) -> Option<Value> {
        match self {
            SettingValue::Role(id) => Some(Value::from(id.0)),
            SettingValue::Flag(b) => Some(Value::Bool(b)),
            SettingValue::Absent => None,
        }
    }
}

/// Raw storage behind the config store
///
/// Values are stored as JSON so backends stay schema-agnostic.
pub trait SettingsBackend: Send + Sync {
    /// # Errors
    ///
    /// `Persistence` when the backing store cannot be read.
    fn load(&self, tenant: &TenantId, key: &str) -> Result<Option<Value>>;

    /// Store `value`, or clear the key when `None`.
    ///
    /// # Errors
    ///
    /// `Persistence` when the backing store cannot be written.
    fn store(&self, tenant: &TenantId, key: &str, value: Option<Value>) -> Result<()>;
}

#[derive(Default)]
pub struct InMemorySettingsBackend {
    values: Mutex<HashMap<(TenantId, String), Value>>,
}

impl InMemorySettingsBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsBackend for InMemorySettingsBackend {
    fn load(&self, tenant: &TenantId, key: &str) -> Result<Option<Value>> {
        let values = self
            .values
            .lock()
            .map_err(|_| ExError::new(ExErrorKind::Internal).with_message("settings lock poisoned"))?;
        Ok(values.get(&(tenant.clone(), key.to_string())).cloned())
    }

    fn store(&self, tenant: &TenantId, key: &str, value: Option<Value>) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| ExError::new(ExErrorKind::Internal).with_message("settings lock poisoned"))?;
        let slot = (tenant.clone(), key.to_string());
        match value {
            Some(v) => values.insert(slot, v),
            None => values.remove(&slot),
        };
        Ok(())
    }
}

pub struct ConfigStore {
    backend: Arc<dyn SettingsBackend>,
    oracle: Arc<dyn PermissionOracle>,
    write_locks: Mutex<HashMap<TenantId, Arc<tokio::sync::Mutex<()>>>>,
}

impl ConfigStore {
    pub fn new(backend: Arc<dyn SettingsBackend>, oracle: Arc<dyn PermissionOracle>) -> Self {
        Self {
            backend,
            oracle,
            write_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Current value of `key`, or its default. Never fails.
    pub fn get(&self, tenant: &TenantId, key: SettingKey) -> SettingValue {
        let raw = match self.backend.load(tenant, key.as_str()) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(
                    tenant_id = tenant.as_str(),
                    setting_key = key.as_str(),
                    err_code = err.code(),
                    "settings read failed, using default"
                );
                None
            }
        };
        let Some(raw) = raw else {
            return key.default_value();
        };
        match key.decode(raw) {
            Some(SettingValue::Absent) | None => {
                tracing::debug!(
                    tenant_id = tenant.as_str(),
                    setting_key = key.as_str(),
                    "stored value unusable, using default"
                );
                key.default_value()
            }
            Some(value) => value,
        }
    }

    pub fn timer_admin(&self, tenant: &TenantId) -> Option<RoleId> {
        match self.get(tenant, SettingKey::TimerAdmin) {
            SettingValue::Role(id) => Some(id),
            _ => None,
        }
    }

    pub fn global_groups(&self, tenant: &TenantId) -> bool {
        matches!(
            self.get(tenant, SettingKey::GlobalGroups),
            SettingValue::Flag(true)
        )
    }

    /// Check that `requester` may change `key`, without writing anything.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` when the requester lacks the required authority.
    pub async fn authorize_write(
        &self,
        tenant: &TenantId,
        key: SettingKey,
        requester: &MemberId,
    ) -> Result<()> {
        let chain = match key {
            SettingKey::TimerAdmin => GuardChain::new().with(RequireManageAuthority),
            SettingKey::GlobalGroups => GuardChain::new().with(RequireTimerAdmin),
        };
        let ctx = GuardContext {
            tenant: Some(tenant),
            requester,
            oracle: self.oracle.as_ref(),
            registry: None,
            admin_role: self.timer_admin(tenant),
        };
        chain.evaluate(&ctx).await
    }

    /// Authorize and store a new value for `key`.
    ///
    /// Writes to the same tenant never interleave; the authorization check
    /// and the write happen under the tenant's lock.
    ///
    /// # Errors
    ///
    /// `PermissionDenied`, `InvalidInput` for a value of the wrong type, or
    /// `Persistence` from the backend.
    pub async fn set(
        &self,
        tenant: &TenantId,
        key: SettingKey,
        value: SettingValue,
        requester: &MemberId,
    ) -> Result<()> {
        let start = Instant::now();
        log_op_start!("config_set", tenant_id = tenant.as_str(), setting_key = key.as_str());

        let result = self.set_locked(tenant, key, value, requester).await;
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(()) => {
                log_op_end!("config_set", duration_ms = duration_ms, setting_key = key.as_str());
            }
            Err(err) => {
                log_op_error!("config_set", err, duration_ms = duration_ms, setting_key = key.as_str());
            }
        }
        result
    }

    async fn set_locked(
        &self,
        tenant: &TenantId,
        key: SettingKey,
        value: SettingValue,
        requester: &MemberId,
    ) -> Result<()> {
        let lock = self.tenant_lock(tenant)?;
        let _guard = lock.lock().await;

        self.authorize_write(tenant, key, requester).await?;
        if !key.accepts(&value) {
            return Err(ExError::from(DomainError::SettingTypeMismatch {
                key: key.as_str().to_string(),
                expected: key.expected().to_string(),
            })
            .with_op("config_set")
            .with_tenant(tenant.as_str()));
        }
        self.backend
            .store(tenant, key.as_str(), value.to_json())
            .map_err(|err| err.with_op("config_set").with_tenant(tenant.as_str()))
    }

    fn tenant_lock(&self, tenant: &TenantId) -> Result<Arc<tokio::sync::Mutex<()>>> {
        let mut locks = self
            .write_locks
            .lock()
            .map_err(|_| ExError::new(ExErrorKind::Internal).with_message("write lock table poisoned"))?;
        Ok(locks.entry(tenant.clone()).or_default().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockall::mock;
    use mockall::predicate::eq;

    mock! {
        Oracle {}

        #[async_trait]
        impl PermissionOracle for Oracle {
            async fn has_manage_authority(&self, tenant: &TenantId, requester: &MemberId) -> Result<bool>;
            async fn holds_role(&self, tenant: &TenantId, requester: &MemberId, role: RoleId) -> Result<bool>;
        }
    }

    fn store(oracle: MockOracle) -> ConfigStore {
        ConfigStore::new(Arc::new(InMemorySettingsBackend::new()), Arc::new(oracle))
    }

    #[test]
    fn test_defaults_for_unset_keys() {
        let store = store(MockOracle::new());
        let t = TenantId::new("t1");
        assert_eq!(store.get(&t, SettingKey::TimerAdmin), SettingValue::Absent);
        assert_eq!(store.get(&t, SettingKey::GlobalGroups), SettingValue::Flag(false));
        assert_eq!(store.timer_admin(&t), None);
        assert!(!store.global_groups(&t));
    }

    #[test]
    fn test_mistyped_stored_value_reads_as_default() {
        let backend = Arc::new(InMemorySettingsBackend::new());
        let t = TenantId::new("t1");
        backend
            .store(&t, "globalgroups", Some(Value::String("yes".into())))
            .unwrap();
        let store = ConfigStore::new(backend, Arc::new(MockOracle::new()));
        assert!(!store.global_groups(&t));
    }

    #[tokio::test]
    async fn test_timeradmin_requires_manage_authority() {
        let mut oracle = MockOracle::new();
        oracle
            .expect_has_manage_authority()
            .returning(|_, requester| Ok(requester.as_str() == "owner"));
        oracle.expect_holds_role().never();
        let store = store(oracle);
        let t = TenantId::new("t1");

        let err = store
            .set(&t, SettingKey::TimerAdmin, SettingValue::Role(RoleId(5)), &MemberId::new("mod"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::PermissionDenied);
        assert_eq!(store.timer_admin(&t), None);

        store
            .set(&t, SettingKey::TimerAdmin, SettingValue::Role(RoleId(5)), &MemberId::new("owner"))
            .await
            .unwrap();
        assert_eq!(store.timer_admin(&t), Some(RoleId(5)));
    }

    #[tokio::test]
    async fn test_globalgroups_accepts_admin_role_holder() {
        let mut oracle = MockOracle::new();
        oracle
            .expect_has_manage_authority()
            .returning(|_, requester| Ok(requester.as_str() == "owner"));
        oracle
            .expect_holds_role()
            .with(mockall::predicate::always(), mockall::predicate::always(), eq(RoleId(5)))
            .returning(|_, requester, _| Ok(requester.as_str() == "helper"));
        let store = store(oracle);
        let t = TenantId::new("t1");

        // Without a configured admin role only manage authority counts.
        let err = store
            .set(&t, SettingKey::GlobalGroups, SettingValue::Flag(true), &MemberId::new("helper"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::PermissionDenied);

        store
            .set(&t, SettingKey::TimerAdmin, SettingValue::Role(RoleId(5)), &MemberId::new("owner"))
            .await
            .unwrap();
        store
            .set(&t, SettingKey::GlobalGroups, SettingValue::Flag(true), &MemberId::new("helper"))
            .await
            .unwrap();
        assert!(store.global_groups(&t));

        let err = store
            .set(&t, SettingKey::GlobalGroups, SettingValue::Flag(false), &MemberId::new("stranger"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::PermissionDenied);
        assert!(store.global_groups(&t));

        // The admin role holder still cannot move the admin role itself.
        let err = store
            .set(&t, SettingKey::TimerAdmin, SettingValue::Absent, &MemberId::new("helper"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::PermissionDenied);
    }

    #[tokio::test]
    async fn test_type_mismatch_is_invalid_input() {
        let mut oracle = MockOracle::new();
        oracle.expect_has_manage_authority().returning(|_, _| Ok(true));
        let store = store(oracle);
        let err = store
            .set(
                &TenantId::new("t1"),
                SettingKey::GlobalGroups,
                SettingValue::Role(RoleId(1)),
                &MemberId::new("owner"),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_concurrent_writes_do_not_tear() {
        let mut oracle = MockOracle::new();
        oracle.expect_has_manage_authority().returning(|_, _| Ok(true));
        let store = Arc::new(store(oracle));
        let t = TenantId::new("t1");

        let mut handles = Vec::new();
        for i in 0..16u64 {
            let store = store.clone();
            let t = t.clone();
            handles.push(tokio::spawn(async move {
                store
                    .set(&t, SettingKey::TimerAdmin, SettingValue::Role(RoleId(i)), &MemberId::new("owner"))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        let final_role = store.timer_admin(&t).unwrap();
        assert!(final_role.0 < 16);
    }
}
