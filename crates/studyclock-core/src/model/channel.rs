use serde::{Deserialize, Serialize};

use super::ids::ChannelId;
use super::NamedObject;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Text,
    Voice,
    /// Anything the wizard never binds to (categories, forums, threads)
    Other,
}

/// A channel in the tenant directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
    pub kind: ChannelKind,
}

impl Channel {
    pub fn new(id: u64, name: impl Into<String>, kind: ChannelKind) -> Self {
        Self {
            id: ChannelId(id),
            name: name.into(),
            kind,
        }
    }

    pub fn text(id: u64, name: impl Into<String>) -> Self {
        Self::new(id, name, ChannelKind::Text)
    }

    pub fn voice(id: u64, name: impl Into<String>) -> Self {
        Self::new(id, name, ChannelKind::Voice)
    }
}

impl NamedObject for Channel {
    const KIND: &'static str = "channel";

    fn name(&self) -> &str {
        &self.name
    }

    fn raw_id(&self) -> Option<u64> {
        Some(self.id.0)
    }

    fn mention(&self) -> String {
        self.id.mention()
    }
}
