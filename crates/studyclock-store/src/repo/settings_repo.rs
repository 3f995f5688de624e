//! Tenant settings persisted as JSON values

use rusqlite::{params, OptionalExtension};
use serde_json::Value;
use studyclock_core::{SettingsBackend, TenantId};

use crate::db::SharedConnection;
use crate::errors::{from_rusqlite, lock_poisoned, serde_error, Result};

/// `SettingsBackend` over the `tenant_settings` table
#[derive(Clone)]
pub struct SqliteSettingsBackend {
    conn: SharedConnection,
}

impl SqliteSettingsBackend {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

impl SettingsBackend for SqliteSettingsBackend {
    fn load(&self, tenant: &TenantId, key: &str) -> Result<Option<Value>> {
        let conn = self.conn.lock().map_err(|_| lock_poisoned())?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM tenant_settings WHERE tenant_id = ?1 AND key = ?2",
                params![tenant.as_str(), key],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)?;

        raw.map(|text| serde_json::from_str(&text).map_err(|e| serde_error("settings_load", e)))
            .transpose()
    }

    fn store(&self, tenant: &TenantId, key: &str, value: Option<Value>) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| lock_poisoned())?;
        match value {
            Some(value) => {
                let text =
                    serde_json::to_string(&value).map_err(|e| serde_error("settings_store", e))?;
                conn.execute(
                    "INSERT INTO tenant_settings (tenant_id, key, value, updated_at)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT (tenant_id, key)
                     DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                    params![
                        tenant.as_str(),
                        key,
                        text,
                        chrono::Utc::now().timestamp_millis()
                    ],
                )
                .map_err(from_rusqlite)?;
            }
            None => {
                conn.execute(
                    "DELETE FROM tenant_settings WHERE tenant_id = ?1 AND key = ?2",
                    params![tenant.as_str(), key],
                )
                .map_err(from_rusqlite)?;
            }
        }
        Ok(())
    }
}
