use strum_macros::{Display, EnumString};

/// The kind of a Steam JWT, decided by its audience.
#[derive(Display, EnumString, Debug, PartialEq, Eq, Clone, Copy)]
#[strum(serialize_all = "snake_case")]
pub enum TokenKind {
    /// A short-lived token sent directly as the login cookie.
    Access,
    /// A long-lived token exchanged for login cookies.
    Refresh,
}
