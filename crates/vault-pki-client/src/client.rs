//! Main Vault API client implementation.

use crate::api::*;
use crate::config::{RateLimit, VaultConfig};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;
use vault_pki_core::{Result, VaultPkiError};

/// Header carrying the client token
const TOKEN_HEADER: &str = "X-Vault-Token";

/// Header selecting a Vault Enterprise namespace
const NAMESPACE_HEADER: &str = "X-Vault-Namespace";

type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Main Vault API client
#[derive(Clone)]
pub struct VaultClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    base_url: Url,
    timeout: Duration,
    rate_limiter: Option<Limiter>,
}

/// Envelope every Vault read response is wrapped in
#[derive(Debug, Deserialize)]
pub(crate) struct VaultResponse<T> {
    pub data: T,
}

#[derive(Debug, Default, Deserialize)]
struct KeyList {
    #[serde(default)]
    keys: Vec<String>,
}

impl VaultClient {
    /// Create a new client for the given address and token using default settings
    pub fn new(address: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        VaultClientBuilder::new(address, token).build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder(address: impl Into<String>, token: impl Into<String>) -> VaultClientBuilder {
        VaultClientBuilder::new(address, token)
    }

    /// Create a client from loaded connection settings
    pub fn from_config(config: &VaultConfig) -> Result<Self> {
        VaultClientBuilder::from_config(config).build()
    }

    /// Create a client from `VAULT_ADDR`, `VAULT_TOKEN` and friends
    pub fn from_env() -> Result<Self> {
        Self::from_config(&VaultConfig::from_env()?)
    }

    /// Server address this client talks to
    #[must_use]
    pub fn address(&self) -> &str {
        self.inner.base_url.as_str().trim_end_matches('/')
    }

    /// Access the endpoints of one PKI mount
    #[must_use]
    pub fn pki(&self, mount: impl Into<String>) -> PkiApi<'_> {
        PkiApi::new(self, mount.into())
    }

    /// Access system backend endpoints
    #[must_use]
    pub fn sys(&self) -> SysApi<'_> {
        SysApi::new(self)
    }

    /// Access token endpoints
    #[must_use]
    pub fn token(&self) -> TokenApi<'_> {
        TokenApi::new(self)
    }

    /// Perform a GET request and unwrap the `data` envelope
    pub(crate) async fn read<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let envelope: VaultResponse<T> = self.get(path).await?;
        Ok(envelope.data)
    }

    /// Perform a GET request
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.build_url(path, false)?;
        debug!(url = %url, "GET request");

        let response = self.send(url).await?;
        self.handle_response(path, response).await
    }

    /// Perform a LIST request and return the keys.
    ///
    /// Vault answers a LIST on an empty path with a 404 carrying no error
    /// messages; that is an empty list, not a missing resource.
    pub(crate) async fn list(&self, path: &str) -> Result<Vec<String>> {
        let url = self.build_url(path, true)?;
        debug!(url = %url, "LIST request");

        let response = self.send(url).await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            let body = response.text().await.map_err(|e| self.transport_error(e))?;
            if error_messages(&body).is_empty() {
                debug!(path, "LIST returned no keys");
                return Ok(Vec::new());
            }
            return Err(status_error(status.as_u16(), path, &body));
        }

        let keys: VaultResponse<KeyList> = self.handle_response(path, response).await?;
        Ok(keys.data.keys)
    }

    async fn send(&self, url: Url) -> Result<reqwest::Response> {
        if let Some(limiter) = &self.inner.rate_limiter {
            limiter.until_ready().await;
        }

        self.inner
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))
    }

    /// Build `<address>/v1/<path>`, percent-encoding each path segment
    fn build_url(&self, path: &str, list: bool) -> Result<Url> {
        let base = &self.inner.base_url;
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|()| VaultPkiError::Config(format!("cannot-be-a-base address: {base}")))?
            .pop_if_empty()
            .push("v1")
            .extend(path.split('/').filter(|s| !s.is_empty()));

        if list {
            url.query_pairs_mut().append_pair("list", "true");
        }

        Ok(url)
    }

    fn transport_error(&self, err: reqwest::Error) -> VaultPkiError {
        if err.is_timeout() {
            VaultPkiError::Timeout(self.inner.timeout.as_secs())
        } else if err.is_connect() {
            VaultPkiError::Connection(err.to_string())
        } else {
            VaultPkiError::Http(err.to_string())
        }
    }

    /// Handle an API response that returns JSON
    async fn handle_response<T: DeserializeOwned>(
        &self,
        path: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await.map_err(|e| self.transport_error(e))?;
            serde_json::from_str(&body).map_err(VaultPkiError::Json)
        } else {
            self.handle_error(status.as_u16(), path, response).await
        }
    }

    /// Convert an error response to a VaultPkiError
    async fn handle_error<T>(
        &self,
        status: u16,
        path: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, path, &body))
    }
}

/// Messages from a Vault `{"errors": [...]}` body
fn error_messages(body: &str) -> Vec<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("errors").and_then(|e| e.as_array()).map(|errors| {
                errors
                    .iter()
                    .filter_map(|e| e.as_str())
                    .map(String::from)
                    .collect()
            })
        })
        .unwrap_or_default()
}

fn status_error(status: u16, path: &str, body: &str) -> VaultPkiError {
    let errors = error_messages(body);
    let message = if errors.is_empty() {
        body.trim().to_string()
    } else {
        errors.join("; ")
    };

    match status {
        401 => VaultPkiError::Unauthorized(message),
        403 => VaultPkiError::PermissionDenied {
            path: path.to_string(),
            message,
        },
        404 => VaultPkiError::NotFound {
            resource: path.to_string(),
        },
        429 => {
            warn!(path, "Rate limited by Vault");
            VaultPkiError::Api {
                code: status,
                message,
            }
        }
        _ => VaultPkiError::Api {
            code: status,
            message,
        },
    }
}

/// Builder for configuring a [`VaultClient`]
pub struct VaultClientBuilder {
    address: String,
    token: String,
    namespace: Option<String>,
    timeout: Duration,
    user_agent: String,
    skip_verify: bool,
    rate_limit: Option<RateLimit>,
}

impl VaultClientBuilder {
    /// Create a new builder with the given address and token
    #[must_use]
    pub fn new(address: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            token: token.into(),
            namespace: None,
            timeout: VaultConfig::DEFAULT_TIMEOUT,
            user_agent: format!("vault-pki-rust/{}", env!("CARGO_PKG_VERSION")),
            skip_verify: false,
            rate_limit: None,
        }
    }

    /// Start from loaded connection settings
    #[must_use]
    pub fn from_config(config: &VaultConfig) -> Self {
        let mut builder = Self::new(&config.address, &config.token)
            .timeout(config.timeout)
            .skip_verify(config.skip_verify);
        builder.namespace = config.namespace.clone();
        builder.rate_limit = config.rate_limit;
        builder
    }

    /// Set the Vault Enterprise namespace
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Accept any TLS certificate from the server
    #[must_use]
    pub fn skip_verify(mut self, skip: bool) -> Self {
        self.skip_verify = skip;
        self
    }

    /// Throttle outgoing requests
    #[must_use]
    pub fn rate_limit(mut self, limit: RateLimit) -> Self {
        self.rate_limit = Some(limit);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<VaultClient> {
        let base_url = Url::parse(&self.address)
            .map_err(|e| VaultPkiError::Config(format!("invalid Vault address {:?}: {e}", self.address)))?;
        if base_url.cannot_be_a_base() {
            return Err(VaultPkiError::Config(format!(
                "invalid Vault address {:?}: expected an http(s) URL",
                self.address
            )));
        }

        let mut headers = HeaderMap::new();
        let mut token = HeaderValue::from_str(&self.token)
            .map_err(|_| VaultPkiError::Config("token contains invalid characters".into()))?;
        token.set_sensitive(true);
        headers.insert(TOKEN_HEADER, token);

        if let Some(namespace) = self.namespace.as_deref().filter(|ns| !ns.is_empty()) {
            let value = HeaderValue::from_str(namespace).map_err(|_| {
                VaultPkiError::Config(format!("invalid namespace {namespace:?}"))
            })?;
            headers.insert(NAMESPACE_HEADER, value);
        }

        if self.skip_verify {
            warn!("TLS certificate verification is disabled");
        }

        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .default_headers(headers)
            .danger_accept_invalid_certs(self.skip_verify)
            .gzip(true)
            .build()
            .map_err(|e| VaultPkiError::Config(format!("failed to build HTTP client: {e}")))?;

        let rate_limiter = self.rate_limit.map(|limit| {
            let quota = Quota::per_second(
                NonZeroU32::new(limit.per_second).unwrap_or(NonZeroU32::MIN),
            )
            .allow_burst(NonZeroU32::new(limit.burst).unwrap_or(NonZeroU32::MIN));
            RateLimiter::direct(quota)
        });

        Ok(VaultClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
                rate_limiter,
            }),
        })
    }
}
