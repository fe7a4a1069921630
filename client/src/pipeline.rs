//! Outbound request pipeline with transparent access token renewal
//!
//! Every request carries the cached access token. A 401 triggers at most one
//! renewal through `auth/refresh` and one resend. Renewal is single-flight:
//! concurrent 401s wait on the same shared future, and the renewal itself
//! runs as a spawned task so it completes even if the request that started
//! it is dropped.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use reqwest::{
    header::{HeaderValue, AUTHORIZATION},
    Client, Method, Request, Response, StatusCode, Url,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use fc_shared::ClientConfig;

use crate::cache::TokenCache;
use crate::error::{ClientError, ClientResult};
use crate::models::{RefreshRequest, TokenResponse};

const REFRESH_PATH: &str = "auth/refresh";

/// Result of one renewal attempt, shared by every request waiting on it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenewalOutcome {
    /// New access token now in the cache
    Renewed(String),
    /// The server refused the refresh token, or there was none; cache cleared
    Rejected,
    /// Transport or server failure; the cache is left alone
    Failed,
}

type PendingRenewal = Shared<BoxFuture<'static, RenewalOutcome>>;

#[derive(Default)]
struct RenewalSlot {
    generation: u64,
    pending: Option<PendingRenewal>,
}

/// Per-request progress through the pipeline
enum RequestState {
    Sending(Request),
    AuthFailed {
        sent_with: Option<String>,
        response: Response,
    },
    Renewing(Request, Response),
    Retrying(Request, String),
    Done(Response),
}

struct Inner {
    http: Client,
    base_url: Url,
    cache: Arc<TokenCache>,
    renewal: Mutex<RenewalSlot>,
}

/// Cloneable handle; clones share the cache and the renewal coordinator
#[derive(Clone)]
pub struct AuthPipeline {
    inner: Arc<Inner>,
}

impl AuthPipeline {
    pub fn new(config: &ClientConfig, cache: Arc<TokenCache>) -> ClientResult<Self> {
        let base_url = Url::parse(&config.api_base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", config.api_base_url, e)))?;
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url,
                cache,
                renewal: Mutex::new(RenewalSlot::default()),
            }),
        })
    }

    pub fn cache(&self) -> &Arc<TokenCache> {
        &self.inner.cache
    }

    /// Absolute URL for a path relative to the API base
    pub fn url(&self, path: &str) -> ClientResult<Url> {
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", path, e)))
    }

    pub async fn get(&self, path: &str) -> ClientResult<Response> {
        let request = self.inner.http.request(Method::GET, self.url(path)?).build()?;
        self.execute(request).await
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> ClientResult<Response> {
        let request = self
            .inner
            .http
            .request(Method::POST, self.url(path)?)
            .json(body)
            .build()?;
        self.execute(request).await
    }

    pub async fn post_empty(&self, path: &str) -> ClientResult<Response> {
        let request = self.inner.http.request(Method::POST, self.url(path)?).build()?;
        self.execute(request).await
    }

    /// Sends `request` with the cached access token, renewing once on 401
    ///
    /// When renewal fails, or the body cannot be replayed, the original 401
    /// response is returned.
    pub async fn execute(&self, request: Request) -> ClientResult<Response> {
        let mut replay = request.try_clone();
        let mut state = RequestState::Sending(request);

        loop {
            state = match state {
                RequestState::Sending(request) => {
                    let sent_with = self.inner.cache.access_token().await;
                    let response = self.send(request, sent_with.as_deref()).await?;
                    if response.status() == StatusCode::UNAUTHORIZED {
                        RequestState::AuthFailed {
                            sent_with,
                            response,
                        }
                    } else {
                        RequestState::Done(response)
                    }
                }
                RequestState::AuthFailed {
                    sent_with,
                    response,
                } => match replay.take() {
                    None => {
                        debug!("Request body is not replayable, skipping renewal");
                        RequestState::Done(response)
                    }
                    Some(request) => match self.inner.cache.access_token().await {
                        // Another request already renewed since this one was sent
                        Some(current) if sent_with.as_ref() != Some(&current) => {
                            RequestState::Retrying(request, current)
                        }
                        _ => RequestState::Renewing(request, response),
                    },
                },
                RequestState::Renewing(request, response) => match self.renew().await {
                    RenewalOutcome::Renewed(access_token) => {
                        RequestState::Retrying(request, access_token)
                    }
                    RenewalOutcome::Rejected | RenewalOutcome::Failed => {
                        RequestState::Done(response)
                    }
                },
                RequestState::Retrying(request, access_token) => {
                    RequestState::Done(self.send(request, Some(&access_token)).await?)
                }
                RequestState::Done(response) => return Ok(response),
            };
        }
    }

    /// Joins the renewal in flight, or starts one
    pub async fn renew(&self) -> RenewalOutcome {
        let pending = {
            let mut slot = self.inner.renewal.lock().await;
            match &slot.pending {
                Some(pending) => pending.clone(),
                None => {
                    slot.generation += 1;
                    let generation = slot.generation;
                    let inner = Arc::clone(&self.inner);
                    let task = tokio::spawn(async move {
                        let outcome = inner.refresh_tokens().await;
                        inner.finish_renewal(generation).await;
                        outcome
                    });
                    let pending = async move { task.await.unwrap_or(RenewalOutcome::Failed) }
                        .boxed()
                        .shared();
                    slot.pending = Some(pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    async fn send(
        &self,
        mut request: Request,
        access_token: Option<&str>,
    ) -> ClientResult<Response> {
        match access_token {
            Some(token) => {
                let value = HeaderValue::from_str(&format!("Bearer {}", token))?;
                request.headers_mut().insert(AUTHORIZATION, value);
                debug!("Api => Authorization header present: Bearer [REDACTED]");
            }
            None => {
                request.headers_mut().remove(AUTHORIZATION);
                debug!("Api => No Authorization header present");
            }
        }

        let method = request.method().clone();
        let url = request.url().clone();
        info!("Api => {} {}", method, url);

        let response = self.inner.http.execute(request).await?;

        info!("Api <= {} for {} {}", response.status().as_u16(), method, url);
        Ok(response)
    }
}

impl Inner {
    async fn refresh_tokens(&self) -> RenewalOutcome {
        let Some(refresh_token) = self.cache.refresh_token().await else {
            debug!("No refresh token cached, cannot renew");
            return RenewalOutcome::Rejected;
        };

        let url = match self.base_url.join(REFRESH_PATH) {
            Ok(url) => url,
            Err(e) => {
                warn!("Invalid refresh URL: {}", e);
                return RenewalOutcome::Failed;
            }
        };

        info!("Api => POST {} (token renewal)", url);
        let response = match self
            .http
            .post(url)
            .json(&RefreshRequest {
                refresh_token: &refresh_token,
            })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Token renewal failed: {}", e);
                return RenewalOutcome::Failed;
            }
        };

        let status = response.status();
        info!("Api <= {} for token renewal", status.as_u16());

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::BAD_REQUEST {
            info!("Refresh token rejected, clearing cached tokens");
            self.cache.clear().await;
            return RenewalOutcome::Rejected;
        }
        if !status.is_success() {
            return RenewalOutcome::Failed;
        }

        match response.json::<TokenResponse>().await {
            Ok(tokens) if !tokens.access_token.is_empty() => {
                self.cache
                    .set_tokens(&tokens.access_token, tokens.refresh_token.as_deref())
                    .await;
                RenewalOutcome::Renewed(tokens.access_token)
            }
            Ok(_) => {
                warn!("Token renewal response carried no access token");
                RenewalOutcome::Failed
            }
            Err(e) => {
                warn!("Malformed token renewal response: {}", e);
                RenewalOutcome::Failed
            }
        }
    }

    async fn finish_renewal(&self, generation: u64) {
        let mut slot = self.renewal.lock().await;
        if slot.generation == generation {
            slot.pending = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryTokenStorage;

    fn pipeline(base: &str) -> AuthPipeline {
        let cache = Arc::new(TokenCache::new(Arc::new(MemoryTokenStorage::new())));
        AuthPipeline::new(&ClientConfig::new(base), cache).unwrap()
    }

    #[test]
    fn test_url_joins_relative_to_base() {
        let pipeline = pipeline("http://api.local:5285/v1");
        assert_eq!(
            pipeline.url("/users/me").unwrap().as_str(),
            "http://api.local:5285/v1/users/me"
        );
        assert_eq!(
            pipeline.url("auth/login").unwrap().as_str(),
            "http://api.local:5285/v1/auth/login"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let cache = Arc::new(TokenCache::new(Arc::new(MemoryTokenStorage::new())));
        let result = AuthPipeline::new(&ClientConfig::new("not a url"), cache);
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_renew_without_refresh_token_is_rejected() {
        let pipeline = pipeline("http://127.0.0.1:9/");
        assert_eq!(pipeline.renew().await, RenewalOutcome::Rejected);
    }

    #[tokio::test]
    async fn test_renew_network_failure_keeps_cache() {
        // Port 9 (discard) is not expected to accept connections
        let pipeline = pipeline("http://127.0.0.1:9/");
        pipeline.cache().set_tokens("a1", Some("r1")).await;

        assert_eq!(pipeline.renew().await, RenewalOutcome::Failed);
        assert_eq!(pipeline.cache().refresh_token().await, Some("r1".to_string()));
    }
}
