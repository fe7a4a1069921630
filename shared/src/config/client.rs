//! Configuration for the consuming application's HTTP pipeline

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::env_or;

/// Settings used by `fc_client` to reach the session API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Base address of the API, with trailing slash
    pub api_base_url: String,

    /// Per-request timeout in seconds, also bounds the renewal call
    pub request_timeout: u64,

    /// File used as durable token storage; in-memory only when unset
    #[serde(default)]
    pub token_store_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::from("http://localhost:5285/"),
            request_timeout: 30,
            token_store_path: None,
        }
    }
}

impl ClientConfig {
    /// Create a configuration pointing at the given base address
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: normalize_base_url(api_base_url.into()),
            ..Default::default()
        }
    }

    /// Persist tokens to the given file
    pub fn with_token_store(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_store_path = Some(path.into());
        self
    }

    /// Set the per-request timeout in seconds
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout = seconds;
        self
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: normalize_base_url(
                std::env::var("API_BASE_URL").unwrap_or(defaults.api_base_url),
            ),
            request_timeout: env_or("API_REQUEST_TIMEOUT", defaults.request_timeout),
            token_store_path: std::env::var("TOKEN_STORE_PATH").ok().map(PathBuf::from),
        }
    }
}

// Relative joins drop the last path segment unless the base ends with '/'.
fn normalize_base_url(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}
