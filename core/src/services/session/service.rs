//! Session lifecycle: register, login, logout, refresh and the current user.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::entities::identity::{normalize_email, Identity, NewIdentity, UserId};
use crate::domain::entities::token::{AccessClaims, TokenPair};
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::{CredentialStore, RefreshTokenRepository};
use crate::services::token::TokenService;

/// Orchestrates the credential store and the token service
///
/// Each operation is an independent unit of work; no state is kept between
/// calls beyond what the stores hold.
pub struct SessionService<R: RefreshTokenRepository, C: CredentialStore> {
    tokens: Arc<TokenService<R, C>>,
    credentials: Arc<C>,
}

impl<R: RefreshTokenRepository, C: CredentialStore> SessionService<R, C> {
    pub fn new(tokens: Arc<TokenService<R, C>>, credentials: Arc<C>) -> Self {
        Self {
            tokens,
            credentials,
        }
    }

    pub fn tokens(&self) -> &Arc<TokenService<R, C>> {
        &self.tokens
    }

    /// Creates an identity; no tokens are issued
    ///
    /// # Errors
    /// * `AuthError::EmailAlreadyRegistered` - An identity with this email exists
    /// * `AuthError::RegistrationRejected` - The credential store refused the input
    pub async fn register(&self, registration: NewIdentity) -> DomainResult<Identity> {
        if self
            .credentials
            .find_by_email(&registration.email)
            .await?
            .is_some()
        {
            debug!("Registration refused, email already registered");
            return Err(AuthError::EmailAlreadyRegistered.into());
        }

        let identity = self.credentials.create(registration).await?;
        info!(user_id = identity.id, "Registered new identity");
        Ok(identity)
    }

    /// Checks credentials and issues a token pair
    ///
    /// An unknown email and a wrong password fail with the same error.
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<TokenPair> {
        let identity = match self.credentials.find_by_email(&normalize_email(email)).await? {
            Some(identity) => identity,
            None => {
                self.credentials.verify_decoy(password).await?;
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !self.credentials.verify_password(&identity, password).await? {
            return Err(AuthError::InvalidCredentials.into());
        }

        self.tokens.issue(&identity).await
    }

    /// Revokes every refresh token of the authenticated caller
    ///
    /// Succeeds even when there was nothing to revoke.
    pub async fn logout(&self, user_id: UserId) -> DomainResult<usize> {
        self.tokens.revoke_all_for_user(user_id).await
    }

    /// Exchanges a refresh token for a new access token
    ///
    /// # Errors
    /// * `AuthError::MissingRefreshToken` - No value, or an empty one
    /// * `TokenError::InvalidRefreshToken` / `TokenError::RefreshTokenExpired` - Rejected
    pub async fn refresh(&self, refresh_token: Option<&str>) -> DomainResult<TokenPair> {
        let value = match refresh_token.map(str::trim) {
            Some(value) if !value.is_empty() => value,
            _ => return Err(AuthError::MissingRefreshToken.into()),
        };

        self.tokens.renew(value).await
    }

    /// Profile of the authenticated caller
    pub async fn current_user(&self, user_id: UserId) -> DomainResult<Identity> {
        self.credentials
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::Auth(AuthError::UserNotFound))
    }

    /// Verifies a bearer access token
    pub fn authenticate(&self, access_token: &str) -> DomainResult<AccessClaims> {
        self.tokens.verify_access_token(access_token)
    }
}
