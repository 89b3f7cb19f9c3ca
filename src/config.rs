//! Connection and logging settings.
//!
//! Settings come from a JSON file (the same `settings.json` the admin panel
//! ships with) or from environment variables. Both paths end in the same
//! normalized [`ApiConfig`].

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::SyncError;

pub const DEFAULT_BASE_URL: &str = "https://localhost:7212/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_BASE_URL: &str = "ADMIN_API_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "ADMIN_API_TIMEOUT_SECS";
pub const ENV_TOKEN: &str = "ADMIN_API_TOKEN";

// ---------------------------------------------------------------------------
// URL normalisation
// ---------------------------------------------------------------------------

/// Normalise the API base URL:
/// - trim whitespace
/// - ensure a scheme is present (https, or http for localhost)
/// - strip trailing slashes
pub fn normalize_base_url(url: &str) -> String {
    let mut url = url.trim().to_string();
    if url.is_empty() {
        return url;
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
            url = format!("http://{url}");
        } else {
            url = format!("https://{url}");
        }
    }

    while url.ends_with('/') {
        url.pop();
    }

    url
}

/// Parse and check a resource endpoint URL.
pub fn parse_endpoint(raw: &str) -> Result<Url, SyncError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SyncError::config("Endpoint URL cannot be empty"));
    }

    let parsed = Url::parse(trimmed)
        .map_err(|e| SyncError::config(format!("Malformed endpoint URL {trimmed}: {e}")))?;
    let scheme = parsed.scheme();
    if scheme != "https" && scheme != "http" {
        return Err(SyncError::config(format!(
            "Only http/https endpoints are supported: {trimmed}"
        )));
    }
    if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
        return Err(SyncError::config(format!(
            "Endpoint URL is missing a host: {trimmed}"
        )));
    }
    Ok(parsed)
}

// ---------------------------------------------------------------------------
// API settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            token: None,
        }
    }
}

impl ApiConfig {
    /// Defaults overridden by `ADMIN_API_BASE_URL`, `ADMIN_API_TIMEOUT_SECS`
    /// and `ADMIN_API_TOKEN`. Unparsable timeouts keep the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            if !url.trim().is_empty() {
                config.base_url = url;
            }
        }
        if let Ok(raw) = std::env::var(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout_secs = secs,
                _ => tracing::warn!(value = %raw, "ignoring invalid {ENV_TIMEOUT_SECS}"),
            }
        }
        if let Ok(token) = std::env::var(ENV_TOKEN) {
            let token = token.trim().to_string();
            if !token.is_empty() {
                config.token = Some(token);
            }
        }
        config.normalized()
    }

    pub fn normalized(mut self) -> Self {
        self.base_url = normalize_base_url(&self.base_url);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Full endpoint URL for a resource path such as `Product`.
    pub fn endpoint(&self, path: &str) -> Result<Url, SyncError> {
        let base = normalize_base_url(&self.base_url);
        if base.is_empty() {
            return Err(SyncError::config("API base URL cannot be empty"));
        }
        let path = path.trim().trim_matches('/');
        if path.is_empty() {
            return parse_endpoint(&base);
        }
        parse_endpoint(&format!("{base}/{path}"))
    }
}

// ---------------------------------------------------------------------------
// Logging settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence when set.
    pub filter: Option<String>,
    /// Directory for daily rolling log files. Console only when unset.
    pub log_dir: Option<PathBuf>,
    /// Emit JSON lines instead of the human-readable format.
    pub json: bool,
}

// ---------------------------------------------------------------------------
// Settings file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub api: ApiConfig,
    pub logging: LogConfig,
}

impl Settings {
    pub fn from_json_str(raw: &str) -> Result<Self, SyncError> {
        let mut settings: Settings = serde_json::from_str(raw)
            .map_err(|e| SyncError::config(format!("Invalid settings JSON: {e}")))?;
        settings.api = settings.api.normalized();
        Ok(settings)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, SyncError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SyncError::config(format!("Cannot read settings {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }
}
