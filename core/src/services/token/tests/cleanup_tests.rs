//! Unit tests for the refresh token purge

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::domain::entities::token::RefreshToken;
use crate::repositories::{InMemoryRefreshTokenRepository, RefreshTokenRepository};
use crate::services::token::{TokenCleanupConfig, TokenCleanupService};

fn enabled() -> TokenCleanupConfig {
    TokenCleanupConfig {
        interval_seconds: 60,
        retention_days: 30,
        enabled: true,
    }
}

async fn seeded() -> Arc<InMemoryRefreshTokenRepository> {
    let repo = Arc::new(InMemoryRefreshTokenRepository::new());
    for value in ["live", "recently-expired", "long-expired"] {
        repo.insert(RefreshToken::new(1, value.to_string(), Duration::days(30)))
            .await
            .unwrap();
    }
    repo.set_expires_at("recently-expired", Utc::now() - Duration::days(2))
        .await;
    repo.set_expires_at("long-expired", Utc::now() - Duration::days(31))
        .await;
    repo
}

#[tokio::test]
async fn test_cleanup_deletes_only_records_past_retention() {
    let repo = seeded().await;
    let service = TokenCleanupService::new(repo.clone(), enabled());

    let result = service.run_cleanup().await.unwrap();

    assert_eq!(result.expired_tokens_deleted, 1);
    assert!(!result.was_skipped());
    assert!(repo.get("long-expired").await.is_none());
    assert!(repo.get("recently-expired").await.is_some());
    assert!(repo.get("live").await.is_some());
}

#[tokio::test]
async fn test_disabled_cleanup_does_nothing() {
    let repo = seeded().await;
    let service = TokenCleanupService::new(
        repo.clone(),
        TokenCleanupConfig {
            enabled: false,
            ..enabled()
        },
    );

    let result = service.run_cleanup().await.unwrap();

    assert!(result.was_skipped());
    assert_eq!(repo.records().await.len(), 3);
}

#[tokio::test]
async fn test_disabled_cleanup_spawns_no_task() {
    let repo = seeded().await;
    let service = Arc::new(TokenCleanupService::new(
        repo,
        TokenCleanupConfig {
            enabled: false,
            ..enabled()
        },
    ));

    assert!(service.start_background_task().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_background_task_runs_on_interval() {
    let repo = seeded().await;
    let service = Arc::new(TokenCleanupService::new(repo.clone(), enabled()));

    let handle = service.start_background_task().unwrap();

    // The first tick fires immediately
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    assert!(repo.get("long-expired").await.is_none());

    handle.abort();
}
