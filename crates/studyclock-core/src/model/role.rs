use serde::{Deserialize, Serialize};

use super::ids::RoleId;
use super::NamedObject;

/// A role in the tenant directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
}

impl Role {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: RoleId(id),
            name: name.into(),
        }
    }
}

impl NamedObject for Role {
    const KIND: &'static str = "role";

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
