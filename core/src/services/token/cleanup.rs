//! Periodic purge of refresh token records that expired long ago
//!
//! Records are never deleted on logout; revoked and expired rows stay for
//! audit until they fall outside the retention window.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{error, info, warn};

use fc_shared::RefreshPurgeConfig;

use crate::errors::DomainError;
use crate::repositories::RefreshTokenRepository;

/// Configuration for token cleanup service
#[derive(Debug, Clone)]
pub struct TokenCleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,
    /// How long after expiry a record is kept (in days)
    pub retention_days: i64,
    /// Whether to enable automatic cleanup
    pub enabled: bool,
}

impl Default for TokenCleanupConfig {
    fn default() -> Self {
        Self::from(&RefreshPurgeConfig::default())
    }
}

impl From<&RefreshPurgeConfig> for TokenCleanupConfig {
    fn from(config: &RefreshPurgeConfig) -> Self {
        Self {
            interval_seconds: config.interval_seconds,
            retention_days: config.retention_days,
            enabled: config.enabled,
        }
    }
}

/// Service for deleting refresh tokens past the retention window
pub struct TokenCleanupService<R: RefreshTokenRepository + 'static> {
    repository: Arc<R>,
    config: TokenCleanupConfig,
}

impl<R: RefreshTokenRepository> TokenCleanupService<R> {
    pub fn new(repository: Arc<R>, config: TokenCleanupConfig) -> Self {
        Self { repository, config }
    }

    /// Run a single cleanup cycle
    ///
    /// Deletes records whose expiry is older than the retention window.
    /// Does nothing when the service is disabled.
    pub async fn run_cleanup(&self) -> Result<CleanupResult, DomainError> {
        if !self.config.enabled {
            return Ok(CleanupResult::default());
        }

        let cutoff = Utc::now() - Duration::days(self.config.retention_days);
        let deleted = self.repository.purge_expired_before(cutoff).await?;

        info!(deleted, %cutoff, "Refresh token purge completed");

        Ok(CleanupResult {
            expired_tokens_deleted: deleted,
            cutoff: Some(cutoff),
        })
    }

    /// Start the cleanup service as a background task
    ///
    /// Spawns a tokio task that runs cleanup at regular intervals.
    pub fn start_background_task(self: Arc<Self>) -> Option<tokio::task::JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Refresh token purge is disabled");
            return None;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds.max(1));

        Some(tokio::spawn(async move {
            info!(
                interval_seconds = self.config.interval_seconds,
                retention_days = self.config.retention_days,
                "Refresh token purge started"
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                if let Err(e) = self.run_cleanup().await {
                    error!("Refresh token purge failed: {}", e);
                }
            }
        }))
    }
}

/// Result of a cleanup operation
#[derive(Debug, Default)]
pub struct CleanupResult {
    /// Number of expired refresh tokens deleted
    pub expired_tokens_deleted: usize,
    /// Expiry cutoff used; `None` when the cycle was skipped
    pub cutoff: Option<DateTime<Utc>>,
}

impl CleanupResult {
    pub fn was_skipped(&self) -> bool {
        self.cutoff.is_none()
    }
}
