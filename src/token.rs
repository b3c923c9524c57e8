//! Inspection of Steam's JWT access and refresh tokens.
//!
//! Tokens are decoded without verifying their signature. They are handed to us by an already
//! authenticated Steam client session and Steam verifies them when they are used.

use crate::enums::TokenKind;
use crate::error::{Error, Result};
use crate::serialize::string;
use crate::SteamID;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use chrono::serde::{ts_seconds, ts_seconds_option};
use serde::Deserialize;

/// Tokens expiring in less than this many seconds are rejected.
pub const MIN_TOKEN_VALIDITY_SECS: i64 = 60;

/// Claims carried by a Steam token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    /// The issuer.
    pub iss: String,
    /// The 64-bit Steam ID of the account the token belongs to.
    #[serde(with = "string")]
    pub sub: u64,
    /// What the token may be used for, e.g. `web`, `renew`, `derive`.
    #[serde(default)]
    pub aud: Vec<String>,
    /// When the token expires.
    #[serde(with = "ts_seconds")]
    pub exp: DateTime<Utc>,
    /// The token is not valid before this time.
    #[serde(default, with = "ts_seconds_option")]
    pub nbf: Option<DateTime<Utc>>,
    /// When the token was issued.
    #[serde(default, with = "ts_seconds_option")]
    pub iat: Option<DateTime<Utc>>,
    /// The token's ID.
    #[serde(default)]
    pub jti: String,
}

impl TokenClaims {
    /// The Steam ID of the account the token belongs to.
    pub fn steamid(&self) -> SteamID {
        SteamID::from(self.sub)
    }

    /// Whether the audience contains `audience`.
    pub fn has_audience(&self, audience: &str) -> bool {
        self.aud.iter().any(|aud| aud == audience)
    }
}

/// A decoded and classified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectedToken {
    /// The decoded claims.
    pub claims: TokenClaims,
    /// Whether this is an access or refresh token.
    pub kind: TokenKind,
}

/// Decodes a token and checks that it can be used to log in to the web.
pub fn inspect(token: &str) -> Result<InspectedToken> {
    inspect_at(token, Utc::now())
}

/// Same as [`inspect`] with the time supplied.
pub fn inspect_at(token: &str, now: DateTime<Utc>) -> Result<InspectedToken> {
    let claims = decode_claims(token)?;

    if !claims.has_audience("web") {
        return Err(Error::InvalidAudience);
    }

    if claims.exp - now < Duration::seconds(MIN_TOKEN_VALIDITY_SECS) {
        return Err(Error::TokenNearExpiry);
    }

    let kind = if claims.has_audience("renew") {
        TokenKind::Refresh
    } else {
        TokenKind::Access
    };

    Ok(InspectedToken {
        claims,
        kind,
    })
}

/// Decodes the claims of a token.
pub fn decode_claims(token: &str) -> Result<TokenClaims> {
    let mut parts = token.trim().split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_header), Some(payload), Some(_signature), None) => payload,
        _ => return Err(Error::InvalidToken("expected three dot-separated parts".into())),
    };
    let bytes = URL_SAFE_NO_PAD
        // Some encoders pad the payload.
        .decode(payload.trim_end_matches('='))
        .map_err(|error| Error::InvalidToken(error.to_string()))?;

    serde_json::from_slice::<TokenClaims>(&bytes)
        .map_err(|error| Error::InvalidToken(error.to_string()))
}
