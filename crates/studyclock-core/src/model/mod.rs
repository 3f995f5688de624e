//! Domain model: tenant-scoped identifiers, directory objects and timer groups

pub mod channel;
pub mod group;
pub mod ids;
pub mod role;

pub use channel::{Channel, ChannelKind};
pub use group::{GroupDraft, TimerGroup};
pub use ids::{ChannelId, MemberId, RoleId, TenantId};
pub use role::Role;

/// Capability shared by every object the resolver can pick from
///
/// Roles, channels and timer groups all expose a display name, an optional
/// platform id and a mention token used when listing choices.
pub trait NamedObject {
    /// Singular noun used in prompts ("role", "channel", "group")
    const KIND: &'static str;

    fn name(&self) -> &str;

    /// Platform-native id, if the object has one
    fn raw_id(&self) -> Option<u64>;

    /// Token shown to the operator when this object is listed
    fn mention(&self) -> String;
}
