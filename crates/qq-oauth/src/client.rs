//! OAuth client construction and the authorization redirect
//!
//! `OAuthClient` is immutable once built. It owns a blocking HTTP client,
//! so a single instance can be cloned and shared across threads; every call
//! runs its own request/response round trip.

use std::time::Duration;

use common::Secret;
use url::Url;

use crate::config::ClientConfig;
use crate::constants::{AUTHORIZE_ENDPOINT, DEFAULT_TIMEOUT_SECS, TOKEN_ENDPOINT, USER_INFO_ENDPOINT};
use crate::error::{Error, Result};

/// Provider endpoint URLs.
///
/// Defaults to the production provider. Override to target a sandbox or a
/// local mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub authorize: String,
    pub token: String,
    pub user_info: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            authorize: AUTHORIZE_ENDPOINT.to_string(),
            token: TOKEN_ENDPOINT.to_string(),
            user_info: USER_INFO_ENDPOINT.to_string(),
        }
    }
}

/// Endpoints after validation.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedEndpoints {
    pub(crate) authorize: Url,
    pub(crate) token: Url,
    pub(crate) user_info: Url,
}

impl ResolvedEndpoints {
    fn resolve(endpoints: &Endpoints) -> Result<Self> {
        Ok(Self {
            authorize: parse_endpoint("authorize", &endpoints.authorize)?,
            token: parse_endpoint("token", &endpoints.token)?,
            user_info: parse_endpoint("user_info", &endpoints.user_info)?,
        })
    }
}

fn parse_endpoint(name: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| Error::InvalidConfig(format!("{name} endpoint {raw:?} is not a URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::InvalidConfig(format!(
            "{name} endpoint must use http or https, got {scheme}"
        ))),
    }
}

/// Client for the provider's authorization-code flow.
///
/// Usual sequence: `build_authorization_url` → (user consents, host receives
/// `code` on its redirect endpoint) → `exchange_code` → `fetch_user_info`.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    pub(crate) client_id: String,
    pub(crate) client_secret: Secret<String>,
    pub(crate) redirect_uri: String,
    pub(crate) endpoints: ResolvedEndpoints,
    pub(crate) http: reqwest::blocking::Client,
    timeout: Duration,
}

impl OAuthClient {
    /// Create a client against the production endpoints.
    ///
    /// Fails with `InvalidConfig` if any value is empty. Performs no I/O.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Result<Self> {
        Self::builder(client_id, client_secret, redirect_uri).build()
    }

    /// Start a builder for clients with custom endpoints or timeout.
    pub fn builder(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> OAuthClientBuilder {
        OAuthClientBuilder {
            client_id: client_id.into(),
            client_secret: Secret::new(client_secret.into()),
            redirect_uri: redirect_uri.into(),
            endpoints: Endpoints::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Build a client from loaded configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let client_secret = config.client.client_secret.clone().ok_or_else(|| {
            Error::InvalidConfig("client secret was not resolved from configuration".into())
        })?;
        OAuthClientBuilder {
            client_id: config.client.client_id.clone(),
            client_secret,
            redirect_uri: config.client.redirect_uri.clone(),
            endpoints: config.endpoints.resolve(),
            timeout: Duration::from_secs(config.client.timeout_secs),
        }
        .build()
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build the URL the user's browser is sent to for consent.
    ///
    /// Carries `client_id`, `redirect_uri`, `state` and `response_type=code`,
    /// form-urlencoded. `state` must be non-empty; see
    /// [`generate_state`](crate::state::generate_state).
    pub fn build_authorization_url(&self, state: &str) -> Result<String> {
        if state.is_empty() {
            return Err(Error::InvalidArgument("state must not be empty".into()));
        }

        let mut url = self.endpoints.authorize.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("state", state)
            .append_pair("response_type", "code");
        Ok(url.into())
    }
}

/// Builder returned by [`OAuthClient::builder`].
#[derive(Debug)]
pub struct OAuthClientBuilder {
    client_id: String,
    client_secret: Secret<String>,
    redirect_uri: String,
    endpoints: Endpoints,
    timeout: Duration,
}

impl OAuthClientBuilder {
    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Per-request timeout covering connect, send and body read.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<OAuthClient> {
        if self.client_id.is_empty() {
            return Err(Error::InvalidConfig("client_id must not be empty".into()));
        }
        if self.client_secret.expose().is_empty() {
            return Err(Error::InvalidConfig("client_secret must not be empty".into()));
        }
        if self.redirect_uri.is_empty() {
            return Err(Error::InvalidConfig("redirect_uri must not be empty".into()));
        }
        if self.timeout.is_zero() {
            return Err(Error::InvalidConfig("timeout must be greater than 0".into()));
        }

        let endpoints = ResolvedEndpoints::resolve(&self.endpoints)?;
        let http = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("building HTTP client: {e}")))?;

        Ok(OAuthClient {
            client_id: self.client_id,
            client_secret: self.client_secret,
            redirect_uri: self.redirect_uri,
            endpoints,
            http,
            timeout: self.timeout,
        })
    }
}

/// Map a transport failure onto `Error::Network` with the failing step.
pub(crate) fn transport_error(step: &str, err: reqwest::Error) -> Error {
    let kind = if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "could not connect"
    } else {
        "failed"
    };
    Error::Network(format!("{step} {kind}: {err}"))
}
