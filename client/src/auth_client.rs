//! Session calls made by the consuming application

use std::sync::Arc;

use reqwest::{Response, StatusCode};
use tracing::{debug, info, warn};

use fc_shared::ClientConfig;

use crate::cache::TokenCache;
use crate::error::{ClientError, ClientResult};
use crate::models::{LoginRequest, RegisterRequest, TokenResponse, UserProfile};
use crate::pipeline::AuthPipeline;
use crate::storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};

pub struct AuthClient {
    pipeline: AuthPipeline,
}

impl AuthClient {
    /// Builds a client with file storage when `token_store_path` is set,
    /// memory storage otherwise
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let storage: Arc<dyn TokenStorage> = match &config.token_store_path {
            Some(path) => Arc::new(FileTokenStorage::new(path)),
            None => Arc::new(MemoryTokenStorage::new()),
        };
        Self::with_storage(config, storage)
    }

    pub fn with_storage(
        config: &ClientConfig,
        storage: Arc<dyn TokenStorage>,
    ) -> ClientResult<Self> {
        let cache = Arc::new(TokenCache::new(storage));
        Ok(Self {
            pipeline: AuthPipeline::new(config, cache)?,
        })
    }

    pub fn pipeline(&self) -> &AuthPipeline {
        &self.pipeline
    }

    pub fn cache(&self) -> &Arc<TokenCache> {
        self.pipeline.cache()
    }

    /// Creates an account; the caller logs in separately
    ///
    /// A rejection carries every server-side message joined with `"; "`.
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<()> {
        let response = self.pipeline.post_json("auth/register", request).await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(api_error(response).await)
    }

    /// Exchanges credentials for a token pair and stores it
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<()> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.pipeline.post_json("auth/login", &body).await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let tokens: TokenResponse = response.json().await?;
        self.cache()
            .set_tokens(&tokens.access_token, tokens.refresh_token.as_deref())
            .await;
        info!("Logged in");
        Ok(())
    }

    /// Revokes the session server-side when a token is held, then forgets
    /// the tokens locally regardless of the outcome
    pub async fn logout(&self) {
        if self.cache().access_token().await.is_some() {
            match self.pipeline.post_empty("auth/logout").await {
                Ok(response) if response.status().is_success() => {
                    debug!("Server session revoked")
                }
                Ok(response) => warn!("Logout returned {}", response.status()),
                Err(e) => warn!("Logout request failed: {}", e),
            }
        }

        self.cache().clear().await;
    }

    /// Profile of the logged-in member, `None` when there is no usable session
    pub async fn current_user(&self) -> ClientResult<Option<UserProfile>> {
        if self.cache().access_token().await.is_none() {
            return Ok(None);
        }

        let response = self.pipeline.get("users/me").await?;
        match response.status() {
            status if status.is_success() => Ok(Some(response.json().await?)),
            StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND => Ok(None),
            _ => Err(api_error(response).await),
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.cache().access_token().await.is_some()
    }
}

async fn api_error(response: Response) -> ClientError {
    let status = response.status();
    let content = response.text().await.unwrap_or_default();
    ClientError::Api {
        status,
        message: error_message(status, &content),
    }
}

/// Human-readable message for a failed response
///
/// Validation bodies (`{"errors": {"Field": ["..."]}}`) are flattened in
/// field order; `{"message": "..."}` and bare JSON strings are used as is;
/// anything else falls back to the raw body, then the status line.
pub fn error_message(status: StatusCode, content: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(content).ok();

    let extracted = parsed.and_then(|root| {
        if let Some(errors) = root.get("errors").and_then(|e| e.as_object()) {
            let parts: Vec<&str> = errors
                .values()
                .filter_map(|v| v.as_array())
                .flatten()
                .filter_map(|m| m.as_str())
                .filter(|m| !m.trim().is_empty())
                .collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        } else if let Some(message) = root.get("message").and_then(|m| m.as_str()) {
            Some(message.to_string())
        } else {
            root.as_str().map(str::to_string)
        }
    });

    match extracted {
        Some(message) if !message.trim().is_empty() => message,
        _ if !content.trim().is_empty() => content.to_string(),
        _ => format!(
            "HTTP {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        )
        .trim_end()
        .to_string(),
    }
}
