//! Unit tests for the token service

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::domain::entities::identity::{Identity, NewIdentity};
use crate::domain::entities::token::AccessClaims;
use crate::errors::{DomainError, TokenError};
use crate::repositories::{
    CredentialStore, InMemoryCredentialStore, InMemoryRefreshTokenRepository,
    RefreshTokenRepository,
};
use crate::services::token::{SigningKeys, TokenService, TokenServiceConfig};

const SECRET: &str = "test-secret-that-is-long-enough-for-hs256";

struct Fixture {
    service: TokenService<InMemoryRefreshTokenRepository, InMemoryCredentialStore>,
    repository: Arc<InMemoryRefreshTokenRepository>,
    credentials: Arc<InMemoryCredentialStore>,
    identity: Identity,
}

async fn fixture_with(config: TokenServiceConfig) -> Fixture {
    let repository = Arc::new(InMemoryRefreshTokenRepository::new());
    let credentials = Arc::new(InMemoryCredentialStore::new());
    let identity = credentials
        .create(NewIdentity::new("a@x.com", "secret1", "Ann", "Lee"))
        .await
        .unwrap();
    let service = TokenService::new(
        repository.clone(),
        credentials.clone(),
        SigningKeys::from_secret(SECRET).unwrap(),
        config,
    );

    Fixture {
        service,
        repository,
        credentials,
        identity,
    }
}

async fn fixture() -> Fixture {
    fixture_with(TokenServiceConfig::default()).await
}

fn token_error(err: DomainError) -> TokenError {
    match err {
        DomainError::Token(e) => e,
        other => panic!("expected token error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_issue_returns_pair_and_persists_refresh_token() {
    let f = fixture().await;
    let pair = f.service.issue(&f.identity).await.unwrap();

    assert_eq!(pair.expires_in, 900);
    assert_eq!(pair.refresh_token.len(), 64);
    assert!(pair.refresh_token.chars().all(|c| c.is_ascii_hexdigit()));

    let record = f
        .repository
        .find_active_by_value(&pair.refresh_token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.user_id, f.identity.id);
    assert!(!record.is_revoked);
    assert_eq!(record.expires_at - record.created_at, Duration::days(30));
}

#[tokio::test]
async fn test_access_token_carries_identity_claims() {
    let f = fixture().await;
    let pair = f.service.issue(&f.identity).await.unwrap();

    let claims = f.service.verify_access_token(&pair.access_token).unwrap();
    assert_eq!(claims.user_id().unwrap(), f.identity.id);
    assert_eq!(claims.email, "a@x.com");
    assert_eq!(claims.iss, "fitness_club");
    assert_eq!(claims.aud, "fitness_club_client");
    assert_eq!(claims.exp - claims.iat, 900);
}

#[tokio::test]
async fn test_two_logins_give_distinct_refresh_tokens() {
    let f = fixture().await;
    let first = f.service.issue(&f.identity).await.unwrap();
    let second = f.service.issue(&f.identity).await.unwrap();

    assert_ne!(first.refresh_token, second.refresh_token);
    assert_eq!(
        f.repository.count_active_for_user(f.identity.id).await.unwrap(),
        2
    );
}

#[tokio::test]
async fn test_refresh_token_values_are_unique() {
    let f = fixture().await;
    let mut seen = HashSet::new();
    for _ in 0..50 {
        let pair = f.service.issue(&f.identity).await.unwrap();
        assert!(seen.insert(pair.refresh_token));
    }
}

#[tokio::test]
async fn test_renew_keeps_refresh_token_without_rotation() {
    let f = fixture().await;
    let pair = f.service.issue(&f.identity).await.unwrap();

    let renewed = f.service.renew(&pair.refresh_token).await.unwrap();
    assert_eq!(renewed.refresh_token, pair.refresh_token);
    assert_eq!(renewed.expires_in, 900);
    assert_ne!(renewed.access_token, pair.access_token);

    // Reusable until revoked
    assert!(f.service.renew(&pair.refresh_token).await.is_ok());
}

#[tokio::test]
async fn test_renew_with_rotation_revokes_predecessor() {
    let f = fixture_with(TokenServiceConfig::default().with_rotation(true)).await;
    let pair = f.service.issue(&f.identity).await.unwrap();

    let renewed = f.service.renew(&pair.refresh_token).await.unwrap();
    assert_ne!(renewed.refresh_token, pair.refresh_token);
    assert!(f.repository.get(&pair.refresh_token).await.unwrap().is_revoked);

    let err = token_error(f.service.renew(&pair.refresh_token).await.unwrap_err());
    assert_eq!(err, TokenError::InvalidRefreshToken);

    assert!(f.service.renew(&renewed.refresh_token).await.is_ok());
}

#[tokio::test]
async fn test_renew_unknown_token_is_rejected() {
    let f = fixture().await;
    let err = token_error(f.service.renew("deadbeef").await.unwrap_err());
    assert_eq!(err, TokenError::InvalidRefreshToken);
}

#[tokio::test]
async fn test_renew_expired_token_is_rejected() {
    let f = fixture().await;
    let pair = f.service.issue(&f.identity).await.unwrap();
    f.repository
        .set_expires_at(&pair.refresh_token, Utc::now() - Duration::seconds(1))
        .await;

    let err = token_error(f.service.renew(&pair.refresh_token).await.unwrap_err());
    assert_eq!(err, TokenError::RefreshTokenExpired);
}

#[tokio::test]
async fn test_renew_rejected_when_identity_deleted() {
    let f = fixture().await;
    let pair = f.service.issue(&f.identity).await.unwrap();
    f.credentials.remove(f.identity.id).await;

    let err = token_error(f.service.renew(&pair.refresh_token).await.unwrap_err());
    assert_eq!(err, TokenError::InvalidRefreshToken);
}

#[tokio::test]
async fn test_revoke_all_for_user() {
    let f = fixture().await;
    let first = f.service.issue(&f.identity).await.unwrap();
    let second = f.service.issue(&f.identity).await.unwrap();

    assert_eq!(f.service.revoke_all_for_user(f.identity.id).await.unwrap(), 2);

    for value in [&first.refresh_token, &second.refresh_token] {
        let err = token_error(f.service.renew(value).await.unwrap_err());
        assert_eq!(err, TokenError::InvalidRefreshToken);
    }

    // Idempotent
    assert_eq!(f.service.revoke_all_for_user(f.identity.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_revoke_all_leaves_other_users_alone() {
    let f = fixture().await;
    let other = f
        .credentials
        .create(NewIdentity::new("b@x.com", "secret2", "Bob", "Ray"))
        .await
        .unwrap();
    f.service.issue(&f.identity).await.unwrap();
    let kept = f.service.issue(&other).await.unwrap();

    f.service.revoke_all_for_user(f.identity.id).await.unwrap();

    assert!(f.service.renew(&kept.refresh_token).await.is_ok());
}

#[tokio::test]
async fn test_expired_access_token_is_rejected() {
    let f = fixture().await;
    let claims = AccessClaims::issued_at(
        &f.identity,
        "fitness_club",
        "fitness_club_client",
        Utc::now() - Duration::minutes(16),
        Duration::minutes(15),
    );
    let token = f.service.sign_claims(&claims).unwrap();

    let err = token_error(f.service.verify_access_token(&token).unwrap_err());
    assert_eq!(err, TokenError::TokenExpired);
}

#[tokio::test]
async fn test_access_token_for_other_audience_is_rejected() {
    let f = fixture().await;
    let claims = AccessClaims::new(&f.identity, "fitness_club", "someone_else", Duration::minutes(15));
    let token = f.service.sign_claims(&claims).unwrap();

    let err = token_error(f.service.verify_access_token(&token).unwrap_err());
    assert_eq!(err, TokenError::InvalidClaims);
}

#[tokio::test]
async fn test_access_token_from_other_issuer_is_rejected() {
    let f = fixture().await;
    let claims = AccessClaims::new(&f.identity, "elsewhere", "fitness_club_client", Duration::minutes(15));
    let token = f.service.sign_claims(&claims).unwrap();

    let err = token_error(f.service.verify_access_token(&token).unwrap_err());
    assert_eq!(err, TokenError::InvalidClaims);
}

#[tokio::test]
async fn test_access_token_signed_with_other_key_is_rejected() {
    let f = fixture().await;
    let other = TokenService::new(
        Arc::new(InMemoryRefreshTokenRepository::new()),
        f.credentials.clone(),
        SigningKeys::from_secret("a-completely-different-secret-of-enough-length").unwrap(),
        TokenServiceConfig::default(),
    );
    let token = other.issue(&f.identity).await.unwrap().access_token;

    let err = token_error(f.service.verify_access_token(&token).unwrap_err());
    assert_eq!(err, TokenError::InvalidSignature);
}

#[tokio::test]
async fn test_garbage_access_token_is_rejected() {
    let f = fixture().await;
    let err = token_error(f.service.verify_access_token("not.a.jwt").unwrap_err());
    assert!(err.is_access_token_rejection());
}

#[tokio::test]
async fn test_non_numeric_subject_is_rejected() {
    let f = fixture().await;
    let mut claims = AccessClaims::new(
        &f.identity,
        "fitness_club",
        "fitness_club_client",
        Duration::minutes(15),
    );
    claims.sub = "abc".to_string();
    let token = f.service.sign_claims(&claims).unwrap();

    let err = token_error(f.service.verify_access_token(&token).unwrap_err());
    assert_eq!(err, TokenError::InvalidClaims);
}

#[tokio::test]
async fn test_access_token_is_not_checked_against_revocation() {
    let f = fixture().await;
    let pair = f.service.issue(&f.identity).await.unwrap();
    f.service.revoke_all_for_user(f.identity.id).await.unwrap();

    assert!(f.service.verify_access_token(&pair.access_token).is_ok());
}
