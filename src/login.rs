use crate::enums::TokenKind;
use crate::error::Result;
use crate::token;
use crate::SteamID;

/// How to establish a web session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginMethod {
    /// Send an access token directly as the login cookie.
    AccessToken {
        /// The account the token belongs to.
        steamid: SteamID,
        /// The access token.
        token: String,
    },
    /// Exchange a refresh token for login cookies through `finalizelogin` and a transfer.
    RefreshToken {
        /// The refresh token.
        token: String,
    },
    /// Log in with a web nonce from a Steam client session through `AuthenticateUser`.
    WebNonce {
        /// The account the nonce belongs to.
        steamid: SteamID,
        /// The single-use web nonce.
        nonce: String,
    },
}

impl LoginMethod {
    /// Selects the login method for a token from its audience.
    pub fn from_token(token: &str) -> Result<Self> {
        let inspected = token::inspect(token)?;
        let token = token.trim().to_string();

        Ok(match inspected.kind {
            TokenKind::Access => Self::AccessToken {
                steamid: inspected.claims.steamid(),
                token,
            },
            TokenKind::Refresh => Self::RefreshToken {
                token,
            },
        })
    }
}
