//! The Steam Community web client.

mod builder;
mod helpers;
mod response;

pub use builder::SteamWebBuilder;
pub use helpers::parse_farmable_games;

use helpers::{
    choose_transfer,
    encode_login_secure,
    parse_avatar_frame,
    parse_avatar_upload,
    parse_inventory,
};
use response::{
    AuthenticateUserResponse,
    FinalizeLoginResponse,
    GetInventoryResponse,
    TransferResponse,
};
use crate::crypto::{generate_session_key, symmetric_encrypt_with_hmac_iv};
use crate::enums::ProfilePrivacy;
use crate::error::{Error, Result};
use crate::helpers::{check_success, generate_sessionid, parses_body};
use crate::login::LoginMethod;
use crate::response::{FarmableGame, InventoryItem, Notifications, PrivacySettings};
use crate::retry::RetryPolicy;
use crate::session::{
    cookies_from_headers,
    find_cookie,
    merge_cookies,
    serialize_cookie_header,
    Session,
    LOGIN_SECURE_COOKIE,
    SESSIONID_COOKIE,
};
use crate::types::{AppId, ContextId, HttpClient};
use crate::SteamID;
use std::sync::{Arc, PoisonError, RwLock};
use bytes::Bytes;
use reqwest::header::{HeaderMap, CONTENT_TYPE, COOKIE, ORIGIN, REFERER};
use reqwest::multipart::{Form, Part};
use reqwest_middleware::RequestBuilder;
use serde::Serialize;

/// The app ID of the Steam inventory.
const STEAM_APPID: AppId = 753;
/// The context of trading cards in the Steam inventory.
const CARDS_CONTEXTID: ContextId = 6;
/// The content type assumed for avatars served without one.
const DEFAULT_AVATAR_CONTENT_TYPE: &str = "image/jpeg";

/// Client for the Steam Community website.
///
/// Clones share the same session.
#[derive(Debug, Clone)]
pub struct SteamWeb {
    client: HttpClient,
    retry_policy: RetryPolicy,
    community_url: String,
    api_url: String,
    login_url: String,
    session: Arc<RwLock<Option<Session>>>,
}

impl SteamWeb {
    /// Creates a client with the default configuration.
    pub fn new() -> Result<Self> {
        SteamWebBuilder::new().build()
    }

    /// Builder for a client.
    pub fn builder() -> SteamWebBuilder {
        SteamWebBuilder::new()
    }

    fn get_url(&self, pathname: &str) -> String {
        format!("{}{}", self.community_url, pathname)
    }

    fn get_profile_url(&self, steamid: u64, pathname: &str) -> String {
        format!("{}/profiles/{}{}", self.community_url, steamid, pathname)
    }

    fn get_api_url(&self, interface: &str, method: &str, version: usize) -> String {
        format!("{}/{}/{}/v{}", self.api_url, interface, method, version)
    }

    /// The current session.
    pub fn session(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The Steam ID of the logged in user.
    pub fn steamid(&self) -> Option<SteamID> {
        self.session().map(|session| session.steamid())
    }

    fn get_session(&self) -> Result<Session> {
        self.session().ok_or(Error::NotLoggedIn)
    }

    fn store_session(&self, session: Option<Session>) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = session;
    }

    /// Merges cookies from a response into the stored session if it is still the session the
    /// request was made with.
    fn harvest_cookies(&self, steamid: u64, headers: &HeaderMap) {
        let mut guard = self.session.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(session) = guard.as_mut().filter(|session| session.steamid == steamid) {
            let cookies = cookies_from_headers(headers);

            if !cookies.is_empty() {
                log::debug!(
                    "Harvested cookies: {}",
                    cookies.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>().join(", "),
                );
            }

            session.add_cookies(cookies);
        }
    }

    /// Sends a request with the given cookies through the retry policy. The request is built
    /// again for every attempt.
    async fn send_with_cookies<F>(
        &self,
        cookies: &str,
        build: F,
    ) -> Result<reqwest::Response>
    where
        F: Fn() -> Result<RequestBuilder>,
    {
        self.retry_policy.execute(|| {
            let request = build()
                .map(|request| request.header(COOKIE, cookies));

            async move {
                Ok::<_, Error>(request?.send().await?)
            }
        }).await
    }

    /// Sends a request with the session's cookies. Fails with [`Error::NotLoggedIn`] when there
    /// is no session.
    async fn send_authenticated<F>(&self, build: F) -> Result<reqwest::Response>
    where
        F: Fn(&Session) -> Result<RequestBuilder>,
    {
        let session = self.get_session()?;
        let response = self.send_with_cookies(&session.cookies, || build(&session)).await?;

        self.harvest_cookies(session.steamid, response.headers());
        Ok(response)
    }

    /// Logs in with an access token or refresh token. The kind of token is detected from its
    /// audience.
    pub async fn login(&self, token: &str) -> Result<Session> {
        let method = LoginMethod::from_token(token)?;

        self.login_with(method).await
    }

    /// Logs in with the given method and stores the resulting session.
    pub async fn login_with(&self, method: LoginMethod) -> Result<Session> {
        let session = match method {
            LoginMethod::AccessToken { steamid, token } => {
                self.login_with_access_token(steamid, &token).await?
            },
            LoginMethod::RefreshToken { token } => {
                self.login_with_refresh_token(&token).await?
            },
            LoginMethod::WebNonce { steamid, nonce } => {
                self.login_with_web_nonce(steamid, &nonce).await?
            },
        };

        log::debug!("Logged in as {}", session.steamid);
        self.store_session(Some(session.clone()));
        Ok(session)
    }

    async fn login_with_web_nonce(
        &self,
        steamid: SteamID,
        nonce: &str,
    ) -> Result<Session> {
        let steamid = u64::from(steamid);
        let uri = self.get_api_url("ISteamUserAuth", "AuthenticateUser", 1);
        let response = self.retry_policy.execute(|| {
            let request = web_nonce_form(steamid, nonce)
                .map(|form| self.client.post(&uri).multipart(form));

            async move {
                Ok::<_, Error>(request?.send().await?)
            }
        }).await?;
        let body = response.bytes().await?;
        let body: AuthenticateUserResponse = parses_body(&body)?;
        let cookies = format!("{LOGIN_SECURE_COOKIE}={};", body.authenticateuser.tokensecure);

        // The session ID is not issued by the server for this login.
        Session::new(steamid, generate_sessionid(), &cookies)
    }

    async fn login_with_access_token(
        &self,
        steamid: SteamID,
        token: &str,
    ) -> Result<Session> {
        let steamid = u64::from(steamid);
        let mut cookies = vec![
            (LOGIN_SECURE_COOKIE.to_string(), encode_login_secure(steamid, token)),
        ];
        let uri = self.get_url("/actions/GetNotificationCounts");
        let response = self.send_with_cookies(
            &serialize_cookie_header(&cookies),
            || Ok(self.client.get(&uri)),
        ).await?;
        let new_cookies = cookies_from_headers(response.headers());
        let body = response.bytes().await?;
        let _notifications: Notifications = parses_body(&body)?;
        let sessionid = match find_cookie(&new_cookies, SESSIONID_COOKIE) {
            Some(sessionid) => sessionid.to_string(),
            None => {
                log::debug!("No session ID was set, generating one");
                generate_sessionid()
            },
        };

        merge_cookies(&mut cookies, new_cookies);
        Session::new(steamid, sessionid, &serialize_cookie_header(&cookies))
    }

    async fn login_with_refresh_token(&self, token: &str) -> Result<Session> {
        #[derive(Serialize, Debug)]
        struct FinalizeLoginForm<'a> {
            nonce: &'a str,
            sessionid: &'a str,
            redir: &'a str,
        }

        #[derive(Serialize, Debug)]
        struct TransferForm<'a> {
            nonce: &'a str,
            auth: &'a str,
            #[serde(rename = "steamID")]
            steamid: u64,
        }

        let sessionid = generate_sessionid();
        let redir = self.get_url("/login/home/?goto=");
        let referer = self.get_url("/");
        let uri = format!("{}/jwt/finalizelogin", self.login_url);
        let form = FinalizeLoginForm {
            nonce: token,
            sessionid: &sessionid,
            redir: &redir,
        };
        let response = self.retry_policy.execute(|| {
            self.client.post(&uri)
                .header(ORIGIN, &self.community_url)
                .header(REFERER, &referer)
                .form(&form)
                .send()
        }).await?;
        let body = response.bytes().await?;
        let body: FinalizeLoginResponse = parses_body(&body)?;

        if let Some(error) = body.error {
            return Err(Error::LoginResult(error));
        }

        let steamid = body.steamid
            .as_deref()
            .and_then(|steamid| steamid.parse::<u64>().ok())
            .ok_or_else(|| Error::InvalidResponse("Missing steamID in finalize login response".into()))?;
        let transfer = choose_transfer(body.transfer_info, &self.community_url)?;
        let form = TransferForm {
            nonce: &transfer.params.nonce,
            auth: &transfer.params.auth,
            steamid,
        };

        log::debug!("Transferring login to {}", transfer.url);

        let response = self.retry_policy.execute(|| {
            self.client.post(&transfer.url)
                .form(&form)
                .send()
        }).await?;
        let cookies = cookies_from_headers(response.headers());
        let body = response.bytes().await?;
        let body: TransferResponse = parses_body(&body)?;

        if body.result != 1 {
            return Err(Error::LoginResult(body.result));
        }

        if find_cookie(&cookies, LOGIN_SECURE_COOKIE).is_none() {
            return Err(Error::SomethingWentWrong);
        }

        let sessionid = find_cookie(&cookies, SESSIONID_COOKIE)
            .map(String::from)
            .unwrap_or(sessionid);

        Session::new(steamid, sessionid, &serialize_cookie_header(&cookies))
    }

    /// Re-uses a previous session. The session is checked with a request and cleared again if
    /// Steam does not accept it.
    pub async fn set_session(&self, session: Session) -> Result<()> {
        let session = Session::new(session.steamid, session.sessionid, &session.cookies)?;

        self.store_session(Some(session));

        if let Err(error) = self.get_notifications().await {
            log::debug!("Session was not accepted: {error}");
            self.store_session(None);
            return Err(error);
        }

        Ok(())
    }

    /// Logs out and clears the session. The session is cleared even if the logout request fails.
    pub async fn logout(&self) {
        #[derive(Serialize, Debug)]
        struct Form<'a> {
            sessionid: &'a str,
        }

        if let Some(session) = self.session() {
            let uri = self.get_url("/login/logout/");
            let result = self.send_with_cookies(&session.cookies, || {
                Ok(self.client.post(&uri)
                    .form(&Form {
                        sessionid: &session.sessionid,
                    }))
            }).await;

            if let Err(error) = result {
                log::warn!("Error logging out: {error}");
            }
        }

        self.store_session(None);
    }

    /// Gets the unread notification counts.
    pub async fn get_notifications(&self) -> Result<Notifications> {
        let uri = self.get_url("/actions/GetNotificationCounts");
        let response = self.send_authenticated(|_session| {
            Ok(self.client.get(&uri))
        }).await?;
        let body = response.bytes().await?;

        parses_body(&body)
    }

    /// Gets the games which still have trading cards to drop.
    pub async fn get_farmable_games(&self) -> Result<Vec<FarmableGame>> {
        let response = self.send_authenticated(|session| {
            Ok(self.client.get(self.get_profile_url(session.steamid, "/badges")))
        }).await?;
        let body = response.text().await?;

        parse_farmable_games(&body)
    }

    /// Gets the trading cards in the Steam inventory.
    pub async fn get_cards_inventory(&self) -> Result<Vec<InventoryItem>> {
        let pathname = format!("/inventory/json/{STEAM_APPID}/{CARDS_CONTEXTID}");
        let response = self.send_authenticated(|session| {
            Ok(self.client.get(self.get_profile_url(session.steamid, &pathname)))
        }).await?;
        let body = response.bytes().await?;
        let body: GetInventoryResponse = parses_body(&body)?;

        parse_inventory(body, CARDS_CONTEXTID)
    }

    /// Downloads an image and sets it as the avatar. Returns the URL of the new avatar.
    pub async fn change_avatar(&self, url: &str) -> Result<String> {
        let url = url::Url::parse(url)?;
        let response = self.retry_policy.execute(|| {
            self.client.get(url.clone()).send()
        }).await?;
        let content_type = response.headers()
            .get(CONTENT_TYPE)
            .and_then(|content_type| content_type.to_str().ok())
            .unwrap_or(DEFAULT_AVATAR_CONTENT_TYPE)
            .to_string();
        let avatar = response.bytes().await?;

        self.upload_avatar(avatar, &content_type).await
    }

    /// Uploads an image as the avatar. Returns the URL of the new avatar.
    pub async fn upload_avatar(
        &self,
        avatar: Bytes,
        content_type: &str,
    ) -> Result<String> {
        // Checks the content type before any request is made.
        Part::bytes(Vec::new()).mime_str(content_type)?;

        let uri = self.get_url("/actions/FileUploader/");
        let response = self.send_authenticated(|session| {
            let avatar = Part::bytes(avatar.to_vec())
                .file_name("blob")
                .mime_str(content_type)?;
            let form = Form::new()
                .part("avatar", avatar)
                .text("type", "player_avatar_image")
                .text("sId", session.steamid.to_string())
                .text("sessionid", session.sessionid.clone())
                .text("doSub", "1")
                .text("json", "1");

            Ok(self.client.post(&uri).multipart(form))
        }).await?;
        let body = response.bytes().await?;

        parse_avatar_upload(&body)
    }

    /// Clears the previous names of the profile.
    pub async fn clear_aliases(&self) -> Result<()> {
        #[derive(Serialize, Debug)]
        struct Form<'a> {
            sessionid: &'a str,
        }

        let response = self.send_authenticated(|session| {
            Ok(self.client.post(self.get_profile_url(session.steamid, "/ajaxclearaliashistory/"))
                .form(&Form {
                    sessionid: &session.sessionid,
                }))
        }).await?;
        let body = response.bytes().await?;

        check_success(&body)
    }

    /// Changes the privacy settings of the profile.
    pub async fn change_privacy(&self, settings: PrivacySettings) -> Result<()> {
        #[derive(Serialize, Debug)]
        struct Form<'a> {
            sessionid: &'a str,
            #[serde(rename = "Privacy")]
            privacy: &'a str,
            #[serde(rename = "eCommentPermission")]
            comment_permission: u8,
        }

        settings.validate()?;

        let privacy = serde_json::to_string(&settings)?;
        let comment_permission = u8::from(settings.comment_permission);
        let response = self.send_authenticated(|session| {
            Ok(self.client.post(self.get_profile_url(session.steamid, "/ajaxsetprivacy/"))
                .header(REFERER, self.get_profile_url(session.steamid, "/edit/settings"))
                .form(&Form {
                    sessionid: &session.sessionid,
                    privacy: &privacy,
                    comment_permission,
                }))
        }).await?;
        let body = response.bytes().await?;

        check_success(&body)
    }

    /// Applies a privacy preset to every section of the profile.
    pub async fn set_profile_privacy(&self, privacy: ProfilePrivacy) -> Result<()> {
        self.change_privacy(PrivacySettings::from(privacy)).await
    }

    /// Gets the URL of the profile's avatar frame, if it has one.
    pub async fn get_avatar_frame(&self) -> Result<Option<String>> {
        let response = self.send_authenticated(|session| {
            Ok(self.client.get(self.get_profile_url(session.steamid, "")))
        }).await?;
        let body = response.text().await?;

        parse_avatar_frame(&body)
    }
}

/// Builds the form for the web nonce login. The session key must not be reused so this is
/// called for every attempt.
fn web_nonce_form(steamid: u64, nonce: &str) -> Result<Form> {
    let session_key = generate_session_key()?;
    let encrypted_loginkey = symmetric_encrypt_with_hmac_iv(nonce.as_bytes(), &session_key.plain)?;

    Ok(Form::new()
        .text("steamid", steamid.to_string())
        .part("encrypted_loginkey", Part::bytes(encrypted_loginkey))
        .part("sessionkey", Part::bytes(session_key.encrypted)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{CommentPermission, PrivacyState};
    use crate::token::tests::{make_token, STEAMID};
    use serde_json::json;
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use wiremock::matchers::{body_string_contains, header_regex, method, path};

    const LOGIN_SECURE: &str = "76561198000000000%7C%7CeyJhbGciOiJFZERTQSJ9.eyJzdWIiOiIxIn0.c2ln";

    fn in_an_hour() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    fn client(server: &MockServer) -> SteamWeb {
        SteamWeb::builder()
            .community_url(server.uri())
            .api_url(server.uri())
            .login_url(server.uri())
            .retry_policy(RetryPolicy::none())
            .build()
            .unwrap()
    }

    fn session() -> Session {
        Session::new(
            STEAMID,
            "abcdef0123456789abcdef01".into(),
            &format!("steamLoginSecure={LOGIN_SECURE};"),
        ).unwrap()
    }

    fn logged_in(server: &MockServer) -> SteamWeb {
        SteamWeb::builder()
            .community_url(server.uri())
            .retry_policy(RetryPolicy::none())
            .session(session())
            .build()
            .unwrap()
    }

    async fn mount_finalize_login(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/jwt/finalizelogin"))
            .and(body_string_contains("sessionid="))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "steamID": STEAMID.to_string(),
                "redir": format!("{}/login/home/?goto=", server.uri()),
                "transfer_info": [
                    {
                        "url": "https://store.steampowered.com/login/settoken",
                        "params": {"nonce": "store-nonce", "auth": "store-auth"}
                    },
                    {
                        "url": format!("{}/login/settoken", server.uri()),
                        "params": {"nonce": "community-nonce", "auth": "community-auth"}
                    }
                ],
                "primary_domain": "steampowered.com"
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn logs_in_with_refresh_token() {
        let server = MockServer::start().await;

        mount_finalize_login(&server).await;
        Mock::given(method("POST"))
            .and(path("/login/settoken"))
            .and(body_string_contains("nonce=community-nonce"))
            .and(body_string_contains("steamID=76561198000000000"))
            .respond_with(ResponseTemplate::new(200)
                .insert_header("set-cookie", format!("steamLoginSecure={LOGIN_SECURE}; Path=/; Secure; HttpOnly, sessionid=fedcba9876543210fedcba98; Path=/; Secure"))
                .set_body_json(json!({"result": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let steam_web = client(&server);
        let token = make_token(&["web", "renew", "derive"], in_an_hour());
        let session = steam_web.login(&token).await.unwrap();

        assert_eq!(session.steamid, STEAMID);
        assert_eq!(session.sessionid, "fedcba9876543210fedcba98");
        assert_eq!(session.login_secure().as_deref(), Some(LOGIN_SECURE));
        assert_eq!(steam_web.session(), Some(session));
        assert_eq!(steam_web.steamid(), Some(SteamID::from(STEAMID)));
    }

    #[tokio::test]
    async fn failed_transfer_is_login_result() {
        let server = MockServer::start().await;

        mount_finalize_login(&server).await;
        Mock::given(method("POST"))
            .and(path("/login/settoken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": 2})))
            .mount(&server)
            .await;

        let steam_web = client(&server);
        let token = make_token(&["web", "renew", "derive"], in_an_hour());

        assert!(matches!(steam_web.login(&token).await, Err(Error::LoginResult(2))));
        assert_eq!(steam_web.session(), None);
    }

    #[tokio::test]
    async fn transfer_without_login_cookie_is_something_went_wrong() {
        let server = MockServer::start().await;

        mount_finalize_login(&server).await;
        Mock::given(method("POST"))
            .and(path("/login/settoken"))
            .respond_with(ResponseTemplate::new(200)
                .insert_header("set-cookie", "sessionid=fedcba9876543210fedcba98; Path=/")
                .set_body_json(json!({"result": 1})))
            .mount(&server)
            .await;

        let steam_web = client(&server);
        let token = make_token(&["web", "renew", "derive"], in_an_hour());

        assert!(matches!(steam_web.login(&token).await, Err(Error::SomethingWentWrong)));
    }

    #[tokio::test]
    async fn finalize_login_error_is_login_result() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/jwt/finalizelogin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false, "error": 15})))
            .mount(&server)
            .await;

        let steam_web = client(&server);
        let token = make_token(&["web", "renew", "derive"], in_an_hour());

        assert!(matches!(steam_web.login(&token).await, Err(Error::LoginResult(15))));
    }

    #[tokio::test]
    async fn logs_in_with_access_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/actions/GetNotificationCounts"))
            .and(header_regex("cookie", r"^steamLoginSecure=76561198000000000%7C%7C[^;]+;$"))
            .respond_with(ResponseTemplate::new(200)
                .insert_header("set-cookie", "sessionid=0123456789abcdef01234567; Path=/; Secure; SameSite=None")
                .set_body_json(json!({"notifications": {"1": 0, "4": 2, "9": 1}})))
            .expect(1)
            .mount(&server)
            .await;

        let steam_web = client(&server);
        let token = make_token(&["web", "mobile"], in_an_hour());
        let session = steam_web.login(&token).await.unwrap();

        assert_eq!(session.steamid, STEAMID);
        assert_eq!(session.sessionid, "0123456789abcdef01234567");
        assert_eq!(
            session.login_secure(),
            Some(format!("{STEAMID}%7C%7C{token}")),
        );
    }

    #[tokio::test]
    async fn access_token_login_generates_missing_sessionid() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/actions/GetNotificationCounts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"notifications": {}})))
            .mount(&server)
            .await;

        let steam_web = client(&server);
        let session = steam_web.login_with(LoginMethod::AccessToken {
            steamid: SteamID::from(STEAMID),
            token: "eyJhbGciOiJFZERTQSJ9.eyJzdWIiOiIxIn0.c2ln".into(),
        }).await.unwrap();

        assert_eq!(session.sessionid.len(), 24);
        assert_eq!(session.get_cookie(SESSIONID_COOKIE), Some(session.sessionid.clone()));
    }

    #[tokio::test]
    async fn logs_in_with_web_nonce() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ISteamUserAuth/AuthenticateUser/v1"))
            .and(header_regex("content-type", "^multipart/form-data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "authenticateuser": {
                    "token": "B0F3D0E6A4A0F1E2",
                    "tokensecure": LOGIN_SECURE,
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let steam_web = client(&server);
        let session = steam_web.login_with(LoginMethod::WebNonce {
            steamid: SteamID::from(STEAMID),
            nonce: "A1B2C3D4E5F6A7B8C9D0".into(),
        }).await.unwrap();

        assert_eq!(session.steamid, STEAMID);
        assert_eq!(session.login_secure().as_deref(), Some(LOGIN_SECURE));
        assert!(session.sessionid.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn web_nonce_rate_limit_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ISteamUserAuth/AuthenticateUser/v1"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&server)
            .await;

        let steam_web = SteamWeb::builder()
            .api_url(server.uri())
            .retry_policy(RetryPolicy::new(2, std::time::Duration::ZERO))
            .build()
            .unwrap();
        let result = steam_web.login_with(LoginMethod::WebNonce {
            steamid: SteamID::from(STEAMID),
            nonce: "A1B2C3D4E5F6A7B8C9D0".into(),
        }).await;

        assert!(matches!(result, Err(Error::RateLimitExceeded)));
    }

    /// The contents of a multipart field, up to the next boundary.
    fn multipart_field(body: &[u8], name: &str) -> Vec<u8> {
        fn find(haystack: &[u8], needle: &[u8]) -> usize {
            haystack
                .windows(needle.len())
                .position(|window| window == needle)
                .unwrap()
        }

        let disposition = format!("name=\"{name}\"");
        let start = find(body, disposition.as_bytes());
        let start = start + find(&body[start..], b"\r\n\r\n") + 4;
        let end = start + find(&body[start..], b"\r\n--");

        body[start..end].to_vec()
    }

    #[tokio::test]
    async fn web_nonce_retry_encrypts_again() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ISteamUserAuth/AuthenticateUser/v1"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/ISteamUserAuth/AuthenticateUser/v1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "authenticateuser": {
                    "token": "B0F3D0E6A4A0F1E2",
                    "tokensecure": LOGIN_SECURE,
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let steam_web = SteamWeb::builder()
            .api_url(server.uri())
            .retry_policy(RetryPolicy::new(2, std::time::Duration::ZERO))
            .build()
            .unwrap();
        let session = steam_web.login_with(LoginMethod::WebNonce {
            steamid: SteamID::from(STEAMID),
            nonce: "A1B2C3D4E5F6A7B8C9D0".into(),
        }).await.unwrap();
        let requests = server.received_requests().await.unwrap();

        assert_eq!(session.login_secure().as_deref(), Some(LOGIN_SECURE));
        assert_eq!(requests.len(), 2);

        for field in ["sessionkey", "encrypted_loginkey"] {
            let first = multipart_field(&requests[0].body, field);
            let second = multipart_field(&requests[1].body, field);

            assert!(!first.is_empty());
            assert_ne!(first, second, "{field} was reused");
        }

        assert_eq!(
            multipart_field(&requests[0].body, "steamid"),
            multipart_field(&requests[1].body, "steamid"),
        );
    }

    #[tokio::test]
    async fn requires_session() {
        let server = MockServer::start().await;
        let steam_web = client(&server);

        assert!(matches!(steam_web.get_farmable_games().await, Err(Error::NotLoggedIn)));
        assert!(matches!(steam_web.get_cards_inventory().await, Err(Error::NotLoggedIn)));
        assert!(matches!(steam_web.clear_aliases().await, Err(Error::NotLoggedIn)));
        assert!(matches!(steam_web.get_notifications().await, Err(Error::NotLoggedIn)));
    }

    #[tokio::test]
    async fn gets_farmable_games() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/profiles/{STEAMID}/badges")))
            .and(header_regex("cookie", "sessionid=abcdef0123456789abcdef01"))
            .respond_with(ResponseTemplate::new(200)
                .set_body_string(include_str!("fixtures/badges.html")))
            .expect(1)
            .mount(&server)
            .await;

        let games = logged_in(&server).get_farmable_games().await.unwrap();

        assert_eq!(games.len(), 3);
        assert_eq!(games[0].appid, 620);
        assert_eq!(games[0].remaining_cards, 12);
    }

    #[tokio::test]
    async fn gets_cards_inventory() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/profiles/{STEAMID}/inventory/json/753/6")))
            .respond_with(ResponseTemplate::new(200)
                .set_body_string(include_str!("fixtures/inventory.json")))
            .mount(&server)
            .await;

        let items = logged_in(&server).get_cards_inventory().await.unwrap();

        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|item| item.contextid == 6));
    }

    #[tokio::test]
    async fn harvests_cookies_into_session() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/actions/GetNotificationCounts"))
            .respond_with(ResponseTemplate::new(200)
                .insert_header("set-cookie", "sessionid=111111111111111111111111; Path=/, steamCountry=US%7Cabc; Path=/")
                .set_body_json(json!({"notifications": {"4": 3}})))
            .mount(&server)
            .await;

        let steam_web = logged_in(&server);
        let notifications = steam_web.get_notifications().await.unwrap();
        let session = steam_web.session().unwrap();

        assert_eq!(notifications.total(), 3);
        assert_eq!(session.sessionid, "111111111111111111111111");
        assert_eq!(session.get_cookie("steamCountry").as_deref(), Some("US%7Cabc"));
        assert_eq!(session.login_secure().as_deref(), Some(LOGIN_SECURE));
    }

    #[tokio::test]
    async fn rejected_session_is_cleared() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/actions/GetNotificationCounts"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let steam_web = client(&server);

        assert!(matches!(steam_web.set_session(session()).await, Err(Error::Unauthorized)));
        assert_eq!(steam_web.session(), None);
    }

    #[tokio::test]
    async fn sets_session() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/actions/GetNotificationCounts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"notifications": {}})))
            .mount(&server)
            .await;

        let steam_web = client(&server);

        steam_web.set_session(session()).await.unwrap();

        assert_eq!(steam_web.session(), Some(session()));
    }

    #[tokio::test]
    async fn logout_clears_session() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/login/logout/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let steam_web = logged_in(&server);

        steam_web.logout().await;

        assert_eq!(steam_web.session(), None);
    }

    #[tokio::test]
    async fn changes_privacy() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/profiles/{STEAMID}/ajaxsetprivacy/")))
            .and(body_string_contains("sessionid=abcdef0123456789abcdef01"))
            .and(body_string_contains("eCommentPermission=2"))
            .and(body_string_contains("PrivacyProfile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": 1, "Privacy": {}})))
            .expect(1)
            .mount(&server)
            .await;

        logged_in(&server).set_profile_privacy(ProfilePrivacy::Private).await.unwrap();
    }

    #[tokio::test]
    async fn invalid_privacy_is_rejected_before_sending() {
        let server = MockServer::start().await;
        let mut settings = PrivacySettings::from(ProfilePrivacy::Public);

        settings.privacy_inventory_gifts = PrivacyState::FriendsOnly;
        settings.comment_permission = CommentPermission::Public;

        let result = logged_in(&server).change_privacy(settings).await;

        assert!(matches!(result, Err(Error::Parameter(_))));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clears_aliases() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/profiles/{STEAMID}/ajaxclearaliashistory/")))
            .and(body_string_contains("sessionid=abcdef0123456789abcdef01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": 1})))
            .expect(1)
            .mount(&server)
            .await;

        logged_in(&server).clear_aliases().await.unwrap();
    }

    #[tokio::test]
    async fn uploads_avatar() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/actions/FileUploader/"))
            .and(body_string_contains("player_avatar_image"))
            .and(body_string_contains("filename=\"blob\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "images": {
                    "0": "https://avatars.fastly.steamstatic.com/abc.jpg",
                    "full": "https://avatars.fastly.steamstatic.com/abc_full.jpg",
                    "medium": "https://avatars.fastly.steamstatic.com/abc_medium.jpg"
                },
                "hash": "abc",
                "message": ""
            })))
            .mount(&server)
            .await;

        let url = logged_in(&server)
            .upload_avatar(Bytes::from_static(b"avatar"), "image/jpeg")
            .await
            .unwrap();

        assert_eq!(url, "https://avatars.fastly.steamstatic.com/abc_full.jpg");
    }

    #[tokio::test]
    async fn changes_avatar_from_url() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/avatar.png"))
            .respond_with(ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(b"PNG".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/actions/FileUploader/"))
            .and(body_string_contains("image/png"))
            .respond_with(ResponseTemplate::new(200).set_body_string("#Error_BadOrMissingSteamCookie"))
            .mount(&server)
            .await;

        let result = logged_in(&server)
            .change_avatar(&format!("{}/avatar.png", server.uri()))
            .await;

        assert!(matches!(result, Err(Error::CookieExpired)));
    }

    #[tokio::test]
    async fn gets_avatar_frame() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/profiles/{STEAMID}")))
            .respond_with(ResponseTemplate::new(200)
                .set_body_string(include_str!("fixtures/profile.html")))
            .mount(&server)
            .await;

        let frame = logged_in(&server).get_avatar_frame().await.unwrap();

        assert!(frame.unwrap().ends_with(".png"));
    }
}
