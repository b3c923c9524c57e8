use super::SteamWeb;
use crate::error::{Error, Result};
use crate::helpers::{
    get_default_client,
    API_URL,
    COMMUNITY_URL,
    DEFAULT_TIMEOUT,
    LOGIN_URL,
    USER_AGENT_STRING,
};
use crate::retry::RetryPolicy;
use crate::session::Session;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use reqwest::Proxy;
use reqwest_middleware::ClientWithMiddleware;

/// Builder for constructing a [`SteamWeb`].
#[derive(Debug, Clone)]
pub struct SteamWebBuilder {
    /// User agent for requests.
    pub(crate) user_agent: &'static str,
    /// Timeout for each request.
    pub(crate) timeout: Duration,
    /// How requests are retried.
    pub(crate) retry_policy: RetryPolicy,
    /// Proxy to send requests through.
    pub(crate) proxy: Option<Proxy>,
    /// Client to use for requests.
    pub(crate) client: Option<ClientWithMiddleware>,
    /// A session to start with.
    pub(crate) session: Option<Session>,
    pub(crate) community_url: String,
    pub(crate) api_url: String,
    pub(crate) login_url: String,
}

impl Default for SteamWebBuilder {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT_STRING,
            timeout: DEFAULT_TIMEOUT,
            retry_policy: RetryPolicy::default(),
            proxy: None,
            client: None,
            session: None,
            community_url: COMMUNITY_URL.into(),
            api_url: API_URL.into(),
            login_url: LOGIN_URL.into(),
        }
    }
}

impl SteamWebBuilder {
    /// Creates a new [`SteamWebBuilder`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The user agent for requests. Ignored when a client is supplied.
    pub fn user_agent(mut self, user_agent: &'static str) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// The timeout for each request. Defaults to 5 seconds. Ignored when a client is supplied.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// How requests are retried. Defaults to 2 retries with 2 seconds between attempts.
    pub fn retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// A proxy to send requests through. Ignored when a client is supplied.
    pub fn proxy(mut self, proxy: Proxy) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Client to use for requests. Cookies are sent with each request by the [`SteamWeb`], so
    /// the client should not have a cookie store of its own.
    pub fn client(mut self, client: ClientWithMiddleware) -> Self {
        self.client = Some(client);
        self
    }

    /// A previously established session. It is not verified until used.
    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// The base URL of the Steam Community. Defaults to `https://steamcommunity.com`.
    pub fn community_url(mut self, community_url: impl Into<String>) -> Self {
        self.community_url = trim_url(community_url.into());
        self
    }

    /// The base URL of the Steam Web API. Defaults to `https://api.steampowered.com`.
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = trim_url(api_url.into());
        self
    }

    /// The base URL of Steam's login service. Defaults to `https://login.steampowered.com`.
    pub fn login_url(mut self, login_url: impl Into<String>) -> Self {
        self.login_url = trim_url(login_url.into());
        self
    }

    /// Builds the [`SteamWeb`].
    pub fn build(self) -> Result<SteamWeb> {
        self.try_into()
    }
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

impl TryFrom<SteamWebBuilder> for SteamWeb {
    type Error = Error;

    fn try_from(builder: SteamWebBuilder) -> Result<Self> {
        let client = match builder.client {
            Some(client) => client,
            None => get_default_client(builder.user_agent, builder.timeout, builder.proxy)?,
        };

        Ok(Self {
            client,
            retry_policy: builder.retry_policy,
            community_url: builder.community_url,
            api_url: builder.api_url,
            login_url: builder.login_url,
            session: Arc::new(RwLock::new(builder.session)),
        })
    }
}
