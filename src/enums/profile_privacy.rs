use strum_macros::{Display, EnumString};

/// A preset applied to every privacy setting at once.
#[derive(Display, EnumString, Debug, PartialEq, Eq, Clone, Copy)]
#[strum(serialize_all = "camelCase")]
pub enum ProfilePrivacy {
    /// Everything is visible to everyone.
    Public,
    /// Everything is visible to friends. Sections without a friends-only option are private.
    FriendsOnly,
    /// Everything is private.
    Private,
}
