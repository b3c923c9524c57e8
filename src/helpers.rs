use crate::error::{Error, Result};
use std::time::Duration;
use rand::RngCore;
use reqwest::{header, Proxy};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use lazy_regex::{regex_captures, regex_is_match};

pub const COMMUNITY_URL: &str = "https://steamcommunity.com";
pub const API_URL: &str = "https://api.steampowered.com";
pub const LOGIN_URL: &str = "https://login.steampowered.com";
pub const USER_AGENT_STRING: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/103.0.0.0 Safari/537.36";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds the client used when none is supplied. Headers are scoped to this client only.
pub fn get_default_client(
    user_agent_string: &'static str,
    timeout: Duration,
    proxy: Option<Proxy>,
) -> Result<ClientWithMiddleware> {
    let mut headers = header::HeaderMap::new();

    headers.insert(header::USER_AGENT, header::HeaderValue::from_static(user_agent_string));

    let mut builder = reqwest::ClientBuilder::new()
        .default_headers(headers)
        .timeout(timeout);

    if let Some(proxy) = proxy {
        builder = builder.proxy(proxy);
    }

    Ok(ClientBuilder::new(builder.build()?).build())
}

/// Whether a redirect location points at the login page.
pub fn is_login(location_option: Option<&header::HeaderValue>) -> bool {
    match location_option {
        Some(location) => {
            if let Ok(location_str) = location.to_str() {
                regex_is_match!("/login", location_str)
            } else {
                false
            }
        },
        None => false,
    }
}

/// Generates a random 24 character hex session ID.
pub fn generate_sessionid() -> String {
    let mut bytes = [0u8; 12];

    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Checks an HTML body for the pages Steam serves in place of JSON.
fn html_error(body: &[u8]) -> Option<Error> {
    let html = String::from_utf8_lossy(body);

    if regex_is_match!(r#"<h1>Sorry!</h1>"#, &html) {
        if let Some((_, message)) = regex_captures!("<h3>(.+)</h3>", &html) {
            Some(Error::Response(message.into()))
        } else {
            Some(Error::Response("Unexpected error".into()))
        }
    } else if regex_is_match!(r#"<h1>Sign In</h1>"#, &html) || regex_is_match!(r#"g_steamID = false;"#, &html) {
        Some(Error::CookieExpired)
    } else {
        None
    }
}

/// Deserializes a JSON body, converting Steam's HTML error pages into errors.
pub fn parses_body<D>(body: &[u8]) -> Result<D>
where
    D: DeserializeOwned,
{
    match serde_json::from_slice::<D>(body) {
        Ok(body) => Ok(body),
        Err(parse_error) => Err(html_error(body).unwrap_or(Error::Parse(parse_error))),
    }
}

/// Checks the `success` field that Steam includes in responses to form submissions. It is
/// either a boolean or a result code where `1` is OK.
pub fn check_success(body: &[u8]) -> Result<()> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Success {
        Bool(bool),
        Code(i64),
    }

    #[derive(Deserialize)]
    struct SuccessResponse {
        success: Success,
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(());
    }

    let response: SuccessResponse = parses_body(body)?;

    match response.success {
        Success::Bool(true) | Success::Code(1) => Ok(()),
        _ => Err(Error::BadRequest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_hex_sessionid() {
        let sessionid = generate_sessionid();

        assert_eq!(sessionid.len(), 24);
        assert!(sessionid.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(sessionid, generate_sessionid());
    }

    #[test]
    fn sign_in_page_is_cookie_expired() {
        let body = br#"<html><body><h1>Sign In</h1><script>g_steamID = false;</script></body></html>"#;
        let error = parses_body::<serde_json::Value>(body).unwrap_err();

        assert!(matches!(error, Error::CookieExpired));
    }

    #[test]
    fn sorry_page_surfaces_message() {
        let body = br#"<div><h1>Sorry!</h1><h3>An error was encountered while processing your request.</h3></div>"#;
        let error = parses_body::<serde_json::Value>(body).unwrap_err();

        assert!(matches!(error, Error::Response(message) if message.starts_with("An error was")));
    }

    #[test]
    fn checks_success_field() {
        assert!(check_success(br#"{"success":1}"#).is_ok());
        assert!(check_success(br#"{"success":true,"Privacy":{}}"#).is_ok());
        assert!(check_success(b"").is_ok());
        assert!(matches!(check_success(br#"{"success":0}"#), Err(Error::BadRequest)));
        assert!(matches!(check_success(br#"{"success":false}"#), Err(Error::BadRequest)));
        assert!(matches!(check_success(br#"{"success":2}"#), Err(Error::BadRequest)));
        assert!(matches!(check_success(br#"{"success":15}"#), Err(Error::BadRequest)));
        assert!(matches!(check_success(br#"{"success":"yes"}"#), Err(Error::Parse(_))));
    }

    #[test]
    fn detects_login_redirect() {
        let location = header::HeaderValue::from_static("https://steamcommunity.com/login/home/?goto=");

        assert!(is_login(Some(&location)));
        assert!(!is_login(None));
    }
}
