//! Session state and cookie handling.

use crate::error::{Error, Result};
use crate::SteamID;
use lazy_regex::regex_captures;
use reqwest::header::{HeaderMap, SET_COOKIE};
use serde::{Deserialize, Serialize};

/// Name of the cookie holding the session ID.
pub const SESSIONID_COOKIE: &str = "sessionid";
/// Name of the cookie authenticating web requests.
pub const LOGIN_SECURE_COOKIE: &str = "steamLoginSecure";

/// A name/value cookie pair.
pub type CookiePair = (String, String);

/// Session data from cookies.
///
/// A session always carries a login cookie belonging to `steamid`. Use [`Session::new`] or
/// [`Session::from_cookie_header`] to construct one; both reject partial sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The session ID.
    pub sessionid: String,
    /// The serialized `Cookie` header, e.g. `sessionid=<id>; steamLoginSecure=<token>;`.
    pub cookies: String,
    /// The Steam ID of the user.
    pub steamid: u64,
}

impl Session {
    /// Creates a session from its parts. The `sessionid` cookie is written into the cookies so
    /// that both always agree.
    pub fn new(
        steamid: u64,
        sessionid: String,
        cookies: &str,
    ) -> Result<Self> {
        let mut pairs = parse_cookie_header(cookies);

        merge_cookies(&mut pairs, vec![(SESSIONID_COOKIE.to_string(), sessionid.clone())]);

        let session = Self {
            sessionid,
            cookies: serialize_cookie_header(&pairs),
            steamid,
        };

        session.validate()?;
        Ok(session)
    }

    /// Creates a session from a `Cookie` header containing both `sessionid` and
    /// `steamLoginSecure`. The Steam ID is read from the login cookie.
    pub fn from_cookie_header(cookies: &str) -> Result<Self> {
        let pairs = parse_cookie_header(cookies);
        let sessionid = find_cookie(&pairs, SESSIONID_COOKIE)
            .ok_or(Error::NotLoggedIn)?
            .to_string();
        let steamid = find_cookie(&pairs, LOGIN_SECURE_COOKIE)
            .and_then(steamid_from_login_secure)
            .ok_or(Error::NotLoggedIn)?;

        Self::new(steamid, sessionid, cookies)
    }

    /// The Steam ID of the user.
    pub fn steamid(&self) -> SteamID {
        SteamID::from(self.steamid)
    }

    /// The value of the cookie named `name`.
    pub fn get_cookie(&self, name: &str) -> Option<String> {
        find_cookie(&parse_cookie_header(&self.cookies), name)
            .map(String::from)
    }

    /// The login token from the `steamLoginSecure` cookie.
    pub fn login_secure(&self) -> Option<String> {
        self.get_cookie(LOGIN_SECURE_COOKIE)
    }

    /// Merges new cookies into the session, tracking the session ID when it changes.
    pub fn add_cookies(&mut self, cookies: Vec<CookiePair>) {
        if cookies.is_empty() {
            return;
        }

        let mut pairs = parse_cookie_header(&self.cookies);

        if let Some(sessionid) = find_cookie(&cookies, SESSIONID_COOKIE) {
            self.sessionid = sessionid.to_string();
        }

        merge_cookies(&mut pairs, cookies);
        self.cookies = serialize_cookie_header(&pairs);
    }

    /// Merges every `set-cookie` header of a response into the session.
    pub fn harvest(&mut self, headers: &HeaderMap) {
        self.add_cookies(cookies_from_headers(headers));
    }

    fn validate(&self) -> Result<()> {
        if self.steamid == 0 || self.sessionid.is_empty() {
            return Err(Error::NotLoggedIn);
        }

        let pairs = parse_cookie_header(&self.cookies);

        match find_cookie(&pairs, LOGIN_SECURE_COOKIE).and_then(steamid_from_login_secure) {
            Some(steamid) if steamid == self.steamid => Ok(()),
            _ => Err(Error::NotLoggedIn),
        }
    }
}

/// Reads the Steam ID that prefixes a `steamLoginSecure` value (`<steamid>||<token>`, either
/// raw or percent-encoded).
pub fn steamid_from_login_secure(value: &str) -> Option<u64> {
    regex_captures!(r#"^(\d+)(?:\|\||%7[Cc]%7[Cc])"#, value)
        .and_then(|(_, steamid)| steamid.parse::<u64>().ok())
}

/// Parses a `Cookie` header into name/value pairs, keeping their order.
pub fn parse_cookie_header(header: &str) -> Vec<CookiePair> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(name, _)| !name.trim().is_empty())
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// Serializes cookie pairs into a `Cookie` header.
pub fn serialize_cookie_header(cookies: &[CookiePair]) -> String {
    cookies
        .iter()
        .map(|(name, value)| format!("{name}={value};"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses a `set-cookie` value into name/value pairs. Several cookies may be joined by commas,
/// e.g. `sessionid=AAA; Path=/, browserid=BBB; Path=/`. Commas inside an `Expires` date do not
/// start a new cookie.
pub fn parse_set_cookie(raw: &str) -> Vec<CookiePair> {
    let mut cookies = Vec::new();

    for entry in raw.split(',') {
        // The first attribute of each cookie is its name/value pair. A segment whose first
        // attribute has no `=` is the tail of an `Expires` date.
        let first = entry.split(';').next().unwrap_or_default().trim();

        if let Some((name, value)) = first.split_once('=') {
            let name = name.trim();

            if !name.is_empty() && !name.contains(' ') {
                cookies.push((name.to_string(), value.trim().to_string()));
            }
        }
    }

    cookies
}

/// Collects the cookies from every `set-cookie` header.
pub fn cookies_from_headers(headers: &HeaderMap) -> Vec<CookiePair> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(parse_set_cookie)
        .collect()
}

/// Merges cookies into `cookies`, replacing values of cookies with the same name in place.
pub fn merge_cookies(cookies: &mut Vec<CookiePair>, new_cookies: Vec<CookiePair>) {
    for (name, value) in new_cookies {
        match cookies.iter_mut().find(|(existing, _)| *existing == name) {
            Some(cookie) => cookie.1 = value,
            None => cookies.push((name, value)),
        }
    }
}

/// Finds the value of the cookie named `name`.
pub fn find_cookie<'a>(cookies: &'a [CookiePair], name: &str) -> Option<&'a str> {
    cookies
        .iter()
        .find(|(cookie_name, _)| cookie_name == name)
        .map(|(_, value)| value.as_str())
}
