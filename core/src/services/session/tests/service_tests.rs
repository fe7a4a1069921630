//! Unit tests for the session service

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::domain::entities::identity::{Identity, NewIdentity, UserId};
use crate::domain::entities::token::AccessClaims;
use crate::errors::{AuthError, DomainError, ErrorCategory, TokenError};
use crate::repositories::{CredentialStore, InMemoryCredentialStore, InMemoryRefreshTokenRepository};
use crate::services::session::SessionService;
use crate::services::token::{SigningKeys, TokenService, TokenServiceConfig};

type Service = SessionService<InMemoryRefreshTokenRepository, InMemoryCredentialStore>;

fn service() -> (Service, Arc<InMemoryCredentialStore>) {
    let repository = Arc::new(InMemoryRefreshTokenRepository::new());
    let credentials = Arc::new(InMemoryCredentialStore::new());
    let tokens = Arc::new(TokenService::new(
        repository,
        credentials.clone(),
        SigningKeys::from_secret("session-test-secret-with-plenty-of-bytes").unwrap(),
        TokenServiceConfig::default(),
    ));
    (SessionService::new(tokens, credentials.clone()), credentials)
}

/// Counts password checks made against the wrapped store
#[derive(Default)]
struct CountingStore {
    inner: InMemoryCredentialStore,
    password_checks: AtomicUsize,
    decoy_checks: AtomicUsize,
}

#[async_trait]
impl CredentialStore for CountingStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, DomainError> {
        self.inner.find_by_email(email).await
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>, DomainError> {
        self.inner.find_by_id(id).await
    }

    async fn create(&self, identity: NewIdentity) -> Result<Identity, DomainError> {
        self.inner.create(identity).await
    }

    async fn verify_password(&self, identity: &Identity, password: &str) -> Result<bool, DomainError> {
        self.password_checks.fetch_add(1, Ordering::SeqCst);
        self.inner.verify_password(identity, password).await
    }

    async fn verify_decoy(&self, password: &str) -> Result<(), DomainError> {
        self.decoy_checks.fetch_add(1, Ordering::SeqCst);
        self.inner.verify_decoy(password).await
    }
}

fn session_over<C: CredentialStore>(
    credentials: Arc<C>,
) -> SessionService<InMemoryRefreshTokenRepository, C> {
    let tokens = Arc::new(TokenService::new(
        Arc::new(InMemoryRefreshTokenRepository::new()),
        credentials.clone(),
        SigningKeys::from_secret("session-test-secret-with-plenty-of-bytes").unwrap(),
        TokenServiceConfig::default(),
    ));
    SessionService::new(tokens, credentials)
}

fn ann() -> NewIdentity {
    NewIdentity::new("a@x.com", "secret1", "Ann", "Lee")
}

#[tokio::test]
async fn test_register_then_login() {
    let (service, _) = service();
    let identity = service.register(ann()).await.unwrap();
    assert_eq!(identity.email, "a@x.com");

    let pair = service.login("a@x.com", "secret1").await.unwrap();
    assert_eq!(pair.expires_in, 900);

    let claims = service.authenticate(&pair.access_token).unwrap();
    assert_eq!(claims.user_id().unwrap(), identity.id);
}

#[tokio::test]
async fn test_login_email_is_case_insensitive() {
    let (service, _) = service();
    service.register(ann()).await.unwrap();
    assert!(service.login("  A@X.COM", "secret1").await.is_ok());
}

#[tokio::test]
async fn test_register_duplicate_email_is_conflict() {
    let (service, _) = service();
    service.register(ann()).await.unwrap();

    let err = service.register(ann()).await.unwrap_err();
    assert!(matches!(err, DomainError::Auth(AuthError::EmailAlreadyRegistered)));
    assert_eq!(err.category(), ErrorCategory::Conflict);
}

#[tokio::test]
async fn test_register_rejected_by_store_is_validation_failure() {
    let (service, _) = service();
    let err = service
        .register(NewIdentity::new("a@x.com", "nodigits", "", ""))
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::ValidationFailed);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let (service, _) = service();
    service.register(ann()).await.unwrap();

    let wrong_password = service.login("a@x.com", "secret2").await.unwrap_err();
    let unknown_email = service.login("b@x.com", "secret1").await.unwrap_err();

    assert_eq!(wrong_password.category(), ErrorCategory::Unauthorized);
    assert_eq!(unknown_email.category(), ErrorCategory::Unauthorized);
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[tokio::test]
async fn test_refresh_requires_a_value() {
    let (service, _) = service();
    for value in [None, Some(""), Some("   ")] {
        let err = service.refresh(value).await.unwrap_err();
        assert!(matches!(err, DomainError::Auth(AuthError::MissingRefreshToken)));
        assert_eq!(err.category(), ErrorCategory::BadRequest);
    }
}

#[tokio::test]
async fn test_refresh_after_logout_is_unauthorized() {
    let (service, _) = service();
    let identity = service.register(ann()).await.unwrap();
    let first = service.login("a@x.com", "secret1").await.unwrap();
    let second = service.login("a@x.com", "secret1").await.unwrap();

    assert!(service.refresh(Some(&first.refresh_token)).await.is_ok());

    assert_eq!(service.logout(identity.id).await.unwrap(), 2);

    for value in [&first.refresh_token, &second.refresh_token] {
        let err = service.refresh(Some(value)).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Unauthorized);
    }
}

#[tokio::test]
async fn test_logout_without_tokens_succeeds() {
    let (service, _) = service();
    let identity = service.register(ann()).await.unwrap();
    assert_eq!(service.logout(identity.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_current_user() {
    let (service, credentials) = service();
    let identity = service.register(ann()).await.unwrap();
    credentials.set_balance_cents(identity.id, 2_500).await;

    let me = service.current_user(identity.id).await.unwrap();
    assert_eq!(me.first_name, "Ann");
    assert_eq!(me.balance(), 25.0);
}

#[tokio::test]
async fn test_current_user_deleted_is_not_found() {
    let (service, credentials) = service();
    let identity = service.register(ann()).await.unwrap();
    credentials.remove(identity.id).await;

    let err = service.current_user(identity.id).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::NotFound);
}

#[tokio::test]
async fn test_stale_access_token_then_refresh() {
    let (service, _) = service();
    let identity = service.register(ann()).await.unwrap();
    let pair = service.login("a@x.com", "secret1").await.unwrap();

    let stale = AccessClaims::issued_at(
        &identity,
        "fitness_club",
        "fitness_club_client",
        Utc::now() - Duration::minutes(15) - Duration::seconds(5),
        Duration::minutes(15),
    );
    let stale = service.tokens().sign_claims(&stale).unwrap();
    let err = service.authenticate(&stale).unwrap_err();
    assert!(matches!(err, DomainError::Token(TokenError::TokenExpired)));

    let renewed = service.refresh(Some(&pair.refresh_token)).await.unwrap();
    let claims = service.authenticate(&renewed.access_token).unwrap();
    assert_eq!(claims.user_id().unwrap(), identity.id);
}

#[tokio::test]
async fn test_unknown_email_still_checks_a_password() {
    let store = Arc::new(CountingStore::default());
    let service = session_over(store.clone());
    service.register(ann()).await.unwrap();

    service.login("a@x.com", "wrong999").await.unwrap_err();
    assert_eq!(store.password_checks.load(Ordering::SeqCst), 1);
    assert_eq!(store.decoy_checks.load(Ordering::SeqCst), 0);

    service.login("nobody@x.com", "wrong999").await.unwrap_err();
    assert_eq!(store.password_checks.load(Ordering::SeqCst), 1);
    assert_eq!(store.decoy_checks.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unknown_email_and_wrong_password_take_comparable_time() {
    let store = Arc::new(InMemoryCredentialStore::new().with_cost(10));
    let service = session_over(store);
    service.register(ann()).await.unwrap();

    // First decoy use also hashes the decoy
    service.login("warmup@x.com", "wrong999").await.unwrap_err();

    let started = std::time::Instant::now();
    service.login("a@x.com", "wrong999").await.unwrap_err();
    let wrong_password = started.elapsed();

    let started = std::time::Instant::now();
    service.login("nobody@x.com", "wrong999").await.unwrap_err();
    let unknown_email = started.elapsed();

    assert!(
        unknown_email * 4 >= wrong_password,
        "unknown email {:?}, wrong password {:?}",
        unknown_email,
        wrong_password
    );
}
