use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::channel::Channel;
use super::ids::{ChannelId, RoleId, TenantId};
use super::role::Role;
use super::NamedObject;

/// A timer group as held by the registry
///
/// The name is unique per tenant (case-insensitively) at creation time. The
/// command core creates and destroys groups but never mutates one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerGroup {
    pub tenant: TenantId,
    pub name: String,
    pub role: RoleId,
    pub channel: ChannelId,
    pub clock_channel: Option<ChannelId>,
    pub created_at: DateTime<Utc>,
}

impl NamedObject for TimerGroup {
    const KIND: &'static str = "group";

    fn name(&self) -> &str {
        &self.name
    }

    fn raw_id(&self) -> Option<u64> {
        None
    }

    /// Groups have no mention token of their own; menus show the bound channel
    fn mention(&self) -> String {
        self.channel.mention()
    }
}

/// A fully resolved creation request, handed to `GroupRegistry::create`
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDraft {
    pub name: String,
    pub role: Role,
    pub channel: Channel,
    pub clock_channel: Option<Channel>,
}

impl GroupDraft {
    /// Materialize the draft as a group owned by `tenant`
    pub fn into_group(self, tenant: TenantId) -> TimerGroup {
        TimerGroup {
            tenant,
            name: self.name,
            role: self.role.id,
            channel: self.channel.id,
            clock_channel: self.clock_channel.map(|c| c.id),
            created_at: Utc::now(),
        }
    }
}
