//! Error types.

use std::num::ParseIntError;
use reqwest::StatusCode;

/// Result type alias for this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Any error that can occur within the crate.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The token could not be decoded.
    #[error("Invalid token: {}", .0)]
    InvalidToken(String),
    /// The token was not issued for web use.
    #[error("InvalidAudience")]
    InvalidAudience,
    /// The token has less than a minute of validity left.
    #[error("TokenNearExpiry")]
    TokenNearExpiry,
    /// Steam responded with 429 Too Many Requests.
    #[error("RateLimitExceeded")]
    RateLimitExceeded,
    /// Steam responded with 401 Unauthorized.
    #[error("Unauthorized")]
    Unauthorized,
    /// The response shows the session cookies are no longer accepted.
    #[error("CookieExpired")]
    CookieExpired,
    /// No session is set on this client.
    #[error("NotLoggedIn")]
    NotLoggedIn,
    /// Steam rejected the submitted form.
    #[error("BadRequest")]
    BadRequest,
    /// The response was missing data or could not be interpreted.
    #[error("Invalid response: {}", .0)]
    InvalidResponse(String),
    /// A login step returned a result code other than OK.
    #[error("Login failed with result {}", .0)]
    LoginResult(i32),
    /// The login transfer succeeded without setting a login cookie.
    #[error("SomethingWentWrong")]
    SomethingWentWrong,
    /// An unexpected HTTP status.
    #[error("Error {}: {}", .status.as_u16(), .status_text)]
    Http {
        /// The status code.
        status: StatusCode,
        /// The canonical reason for the status.
        status_text: String,
    },
    /// An error message reported by Steam.
    #[error("Unexpected response: {}", .0)]
    Response(String),
    /// An invalid parameter was given.
    #[error("Invalid parameter: {}", .0)]
    Parameter(&'static str),
    /// Request error.
    #[error("Request error: {}", .0)]
    Reqwest(#[from] reqwest::Error),
    /// Request middleware error.
    #[error("Request middleware error: {}", .0)]
    ReqwestMiddleware(anyhow::Error),
    /// A JSON body could not be parsed.
    #[error("Error parsing response: {}", .0)]
    Parse(#[from] serde_json::Error),
    /// A URL could not be parsed.
    #[error("Error parsing URL: {}", .0)]
    Url(#[from] url::ParseError),
    /// An HTML document could not be parsed.
    #[error("Error parsing HTML document: {}", .0)]
    Html(#[from] ParseHtmlError),
    /// Encryption of login credentials failed.
    #[error("Crypto error: {}", .0)]
    Crypto(String),
}

impl Error {
    /// Whether this error means the session must be re-established before retrying.
    pub fn is_session_error(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized | Self::CookieExpired | Self::NotLoggedIn,
        )
    }

    /// Whether retrying the request that produced this error could succeed. Errors raised
    /// while building a request will occur again on every attempt.
    pub(crate) fn is_transient(&self) -> bool {
        match self {
            Self::Reqwest(error) => !error.is_builder(),
            Self::ReqwestMiddleware(_) => true,
            _ => false,
        }
    }

    /// Builds an [`Error::Http`] from a status code.
    pub(crate) fn from_status(status: StatusCode) -> Self {
        Self::Http {
            status,
            status_text: status
                .canonical_reason()
                .unwrap_or("Unknown")
                .into(),
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(error: reqwest_middleware::Error) -> Error {
        match error {
            reqwest_middleware::Error::Reqwest(e) => Error::Reqwest(e),
            reqwest_middleware::Error::Middleware(e) => Error::ReqwestMiddleware(e),
        }
    }
}

impl From<rsa::Error> for Error {
    fn from(error: rsa::Error) -> Error {
        Error::Crypto(error.to_string())
    }
}

/// An error occurred when parsing HTML.
#[derive(thiserror::Error, Debug)]
pub enum ParseHtmlError {
    /// The HTML is not formatted as expected.
    #[error("{}", .0)]
    Malformed(&'static str),
    /// A selector could not be parsed.
    #[error("Invalid selector")]
    ParseSelector,
    /// A number could not be parsed.
    #[error("{}", .0)]
    ParseInt(#[from] ParseIntError),
}
