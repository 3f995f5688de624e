//! Timer groups persisted in SQLite

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Row};
use studyclock_core::errors::{DomainError, ExError, ExErrorKind};
use studyclock_core::model::ChannelId;
use studyclock_core::registry::{filter_groups, fold_group_name};
use studyclock_core::{GroupDraft, GroupRegistry, RoleId, TenantId, TimerGroup};
use tracing::debug;

use crate::db::SharedConnection;
use crate::errors::{from_rusqlite, is_unique_violation, lock_poisoned, Result};

/// `GroupRegistry` over the `timer_groups` table
///
/// Uniqueness is enforced on the folded name, the same fold the core uses
/// for matching, so names differing only in case never coexist.
///
/// Snowflake ids are stored as SQLite integers; they fit in 63 bits.
#[derive(Clone)]
pub struct SqliteGroupRegistry {
    conn: SharedConnection,
}

impl SqliteGroupRegistry {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// All groups of a tenant, in creation order
    ///
    /// # Errors
    ///
    /// `Persistence` on storage failures.
    pub fn list(&self, tenant: &TenantId) -> Result<Vec<TimerGroup>> {
        let conn = self.conn.lock().map_err(|_| lock_poisoned())?;
        let mut stmt = conn
            .prepare(
                "SELECT tenant_id, name, role_id, channel_id, clock_channel_id, created_at
                 FROM timer_groups WHERE tenant_id = ?1 ORDER BY id",
            )
            .map_err(from_rusqlite)?;
        let groups = stmt
            .query_map([tenant.as_str()], group_from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(groups)
    }
}

fn group_from_row(row: &Row<'_>) -> rusqlite::Result<TimerGroup> {
    let tenant: String = row.get(0)?;
    let role: i64 = row.get(2)?;
    let channel: i64 = row.get(3)?;
    let clock: Option<i64> = row.get(4)?;
    let created_ms: i64 = row.get(5)?;
    Ok(TimerGroup {
        tenant: TenantId::new(tenant),
        name: row.get(1)?,
        role: RoleId(role as u64),
        channel: ChannelId(channel as u64),
        clock_channel: clock.map(|c| ChannelId(c as u64)),
        created_at: millis_to_datetime(created_ms),
    })
}

fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
}

#[async_trait]
impl GroupRegistry for SqliteGroupRegistry {
    async fn create(&self, tenant: &TenantId, draft: &GroupDraft) -> Result<TimerGroup> {
        let group = draft.clone().into_group(tenant.clone());
        let conn = self.conn.lock().map_err(|_| lock_poisoned())?;
        conn.execute(
            "INSERT INTO timer_groups
                (tenant_id, name, name_key, role_id, channel_id, clock_channel_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                tenant.as_str(),
                group.name,
                fold_group_name(&group.name),
                group.role.0 as i64,
                group.channel.0 as i64,
                group.clock_channel.map(|c| c.0 as i64),
                group.created_at.timestamp_millis(),
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                ExError::from(DomainError::GroupNameTaken {
                    name: group.name.clone(),
                })
                .with_tenant(tenant.as_str())
            } else {
                from_rusqlite(e)
            }
        })?;
        debug!(tenant_id = %tenant, group_name = %group.name, "group persisted");
        Ok(group)
    }

    async fn destroy(&self, group: &TimerGroup) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| lock_poisoned())?;
        let removed = conn
            .execute(
                "DELETE FROM timer_groups WHERE tenant_id = ?1 AND name = ?2",
                params![group.tenant.as_str(), group.name],
            )
            .map_err(from_rusqlite)?;
        if removed == 0 {
            return Err(ExError::new(ExErrorKind::NotFound)
                .with_op("group_destroy")
                .with_tenant(group.tenant.as_str())
                .with_entity(group.name.clone())
                .with_message(format!("The group `{}` no longer exists.", group.name)));
        }
        Ok(())
    }

    async fn find_matching(&self, tenant: &TenantId, query: &str) -> Result<Vec<TimerGroup>> {
        Ok(filter_groups(self.list(tenant)?, query))
    }
}
