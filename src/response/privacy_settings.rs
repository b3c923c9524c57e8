use crate::enums::{CommentPermission, PrivacyState, ProfilePrivacy};
use crate::error::{Error, Result};
use serde::Serialize;

/// Privacy settings for a profile.
///
/// The gifts and playtime sections only accept [`PrivacyState::Private`] or
/// [`PrivacyState::Public`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PrivacySettings {
    pub privacy_profile: PrivacyState,
    pub privacy_inventory: PrivacyState,
    pub privacy_inventory_gifts: PrivacyState,
    pub privacy_owned_games: PrivacyState,
    /// [`PrivacyState::Public`] makes playtime follow the owned games setting.
    pub privacy_playtime: PrivacyState,
    pub privacy_friends_list: PrivacyState,
    /// Sent separately from the other settings.
    #[serde(skip)]
    pub comment_permission: CommentPermission,
}

impl PrivacySettings {
    /// Checks that the two-state sections are not set to friends only.
    pub fn validate(&self) -> Result<()> {
        if self.privacy_inventory_gifts == PrivacyState::FriendsOnly {
            return Err(Error::Parameter("Gifts privacy cannot be friends only"));
        }

        if self.privacy_playtime == PrivacyState::FriendsOnly {
            return Err(Error::Parameter("Playtime privacy cannot be friends only"));
        }

        Ok(())
    }
}

impl From<ProfilePrivacy> for PrivacySettings {
    fn from(preset: ProfilePrivacy) -> Self {
        let (state, two_state, comment_permission) = match preset {
            ProfilePrivacy::Public => (PrivacyState::Public, PrivacyState::Public, CommentPermission::Public),
            ProfilePrivacy::FriendsOnly => (PrivacyState::FriendsOnly, PrivacyState::Private, CommentPermission::FriendsOnly),
            ProfilePrivacy::Private => (PrivacyState::Private, PrivacyState::Private, CommentPermission::Private),
        };
        // Playtime stays public unless everything is private so that it follows the owned
        // games setting.
        let playtime = match preset {
            ProfilePrivacy::Private => PrivacyState::Private,
            _ => PrivacyState::Public,
        };

        Self {
            privacy_profile: state,
            privacy_inventory: state,
            privacy_inventory_gifts: two_state,
            privacy_owned_games: state,
            privacy_playtime: playtime,
            privacy_friends_list: state,
            comment_permission,
        }
    }
}
