//! Enumerated types.

mod comment_permission;
mod privacy_state;
mod profile_privacy;
mod token_kind;

pub use comment_permission::CommentPermission;
pub use privacy_state::PrivacyState;
pub use profile_privacy::ProfilePrivacy;
pub use token_kind::TokenKind;
