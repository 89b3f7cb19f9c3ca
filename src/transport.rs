//! HTTP transport for the admin REST API.
//!
//! Defines the `HttpTransport` trait the controller talks to and the
//! reqwest-backed implementation used in production.

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::TransportError;

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!(
    "admin-resource-sync/",
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("BUILD_GIT_SHA"),
    ")"
);

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            body: None,
        }
    }

    pub fn post(url: Url, body: Value) -> Self {
        Self {
            method: Method::POST,
            url,
            body: Some(body),
        }
    }

    pub fn put(url: Url, body: Value) -> Self {
        Self {
            method: Method::PUT,
            url,
            body: Some(body),
        }
    }

    pub fn delete(url: Url) -> Self {
        Self {
            method: Method::DELETE,
            url,
            body: None,
        }
    }
}

/// Status code and raw body text. Parsing is the caller's business, since
/// list and write responses are interpreted differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Abstract request/response transport.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue one request. Non-2xx statuses are responses, not errors; only
    /// failures below HTTP (connect, timeout, body read) are `Err`.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Source of the bearer token attached to requests. Where the token lives
/// is up to the host.
pub trait TokenProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// A fixed token, typically from `ADMIN_API_TOKEN`.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticToken(***)")
    }
}

impl TokenProvider for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        let token = self.0.trim();
        (!token.is_empty()).then(|| token.to_string())
    }
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Convert a `reqwest::Error` into a user-friendly message.
fn friendly_error(url: &Url, err: &reqwest::Error) -> TransportError {
    let host = url.host_str().unwrap_or("the API server");
    if err.is_connect() {
        return TransportError::new(format!("Cannot reach {host}"));
    }
    if err.is_timeout() {
        return TransportError::new(format!("Connection to {host} timed out"));
    }
    if err.is_builder() {
        return TransportError::new(format!("Invalid request URL: {url}"));
    }
    TransportError::new(format!("Network error communicating with {host}: {err}"))
}

// ---------------------------------------------------------------------------
// reqwest transport
// ---------------------------------------------------------------------------

pub struct ReqwestTransport {
    client: Client,
    token: Option<Arc<dyn TokenProvider>>,
}

impl ReqwestTransport {
    pub fn new(config: &ApiConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::new(format!("Failed to create HTTP client: {e}")))?;
        let token = config
            .token
            .clone()
            .map(|t| Arc::new(StaticToken::new(t)) as Arc<dyn TokenProvider>);
        Ok(Self { client, token })
    }

    pub fn with_token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.token = Some(provider);
        self
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let ApiRequest { method, url, body } = request;

        let mut req = self
            .client
            .request(method.clone(), url.clone())
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = self.token.as_ref().and_then(|p| p.bearer_token()) {
            req = req.bearer_auth(token);
        }
        if let Some(b) = body {
            req = req.json(&b);
        }

        let resp = req.send().await.map_err(|e| friendly_error(&url, &e))?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| friendly_error(&url, &e))?;
        debug!(%method, %url, status, bytes = body.len(), "api response");
        Ok(ApiResponse { status, body })
    }
}
