//! Main token service implementation

use std::sync::Arc;

use constant_time_eq::constant_time_eq;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Header, Validation};
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{debug, info, warn};

use crate::domain::entities::identity::{Identity, UserId};
use crate::domain::entities::token::{AccessClaims, RefreshToken, TokenPair};
use crate::errors::{DomainError, TokenError};
use crate::repositories::{CredentialStore, RefreshTokenRepository};

use super::config::TokenServiceConfig;
use super::keys::SigningKeys;

/// Random bytes behind each refresh token value
const REFRESH_TOKEN_BYTES: usize = 32;

/// Attempts at storing a fresh refresh token before a value collision is
/// reported as an error
const MAX_INSERT_ATTEMPTS: usize = 3;

/// Issues, renews and verifies tokens
pub struct TokenService<R: RefreshTokenRepository, C: CredentialStore> {
    repository: Arc<R>,
    credentials: Arc<C>,
    keys: SigningKeys,
    config: TokenServiceConfig,
    validation: Validation,
}

impl<R: RefreshTokenRepository, C: CredentialStore> TokenService<R, C> {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `repository` - Refresh token persistence
    /// * `credentials` - Identity source used when renewing
    /// * `keys` - Signing keys validated at startup
    /// * `config` - Issuer, audience and lifetimes
    pub fn new(
        repository: Arc<R>,
        credentials: Arc<C>,
        keys: SigningKeys,
        config: TokenServiceConfig,
    ) -> Self {
        let mut validation = Validation::new(keys.algorithm());
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "aud", "sub"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = config.leeway_seconds;

        Self {
            repository,
            credentials,
            keys,
            config,
            validation,
        }
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Issues a new access/refresh token pair for an authenticated identity
    ///
    /// The refresh token is persisted before the pair is returned.
    pub async fn issue(&self, identity: &Identity) -> Result<TokenPair, DomainError> {
        let access_token = self.generate_access_token(identity)?;
        let refresh = self.store_new_refresh_token(identity.id).await?;

        info!(user_id = identity.id, refresh_id = %refresh.id, "Issued token pair");

        Ok(TokenPair::new(
            access_token,
            refresh.token,
            self.config.access_token_expires_in(),
        ))
    }

    /// Exchanges a refresh token for a new access token
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - New access token with the same refresh token, or a
    ///   replacement when rotation is enabled
    /// * `Err(TokenError::InvalidRefreshToken)` - Unknown, revoked, or its
    ///   identity no longer exists
    /// * `Err(TokenError::RefreshTokenExpired)` - Past its expiry
    pub async fn renew(&self, value: &str) -> Result<TokenPair, DomainError> {
        let record = self
            .repository
            .find_active_by_value(value)
            .await?
            .filter(|record| constant_time_eq(record.token.as_bytes(), value.as_bytes()))
            .ok_or(TokenError::InvalidRefreshToken)?;

        if record.is_expired() {
            debug!(refresh_id = %record.id, "Refresh token expired");
            return Err(TokenError::RefreshTokenExpired.into());
        }

        let identity = match self.credentials.find_by_id(record.user_id).await? {
            Some(identity) => identity,
            None => {
                warn!(user_id = record.user_id, "Refresh token owner no longer exists");
                return Err(TokenError::InvalidRefreshToken.into());
            }
        };

        let access_token = self.generate_access_token(&identity)?;

        let refresh_token = if self.config.rotate_refresh_tokens {
            // Only the caller that flips the predecessor to revoked may rotate it
            if !self.repository.mark_revoked(&record).await? {
                return Err(TokenError::InvalidRefreshToken.into());
            }
            let successor = self.store_new_refresh_token(identity.id).await?;
            debug!(from = %record.id, to = %successor.id, "Rotated refresh token");
            successor.token
        } else {
            record.token
        };

        Ok(TokenPair::new(
            access_token,
            refresh_token,
            self.config.access_token_expires_in(),
        ))
    }

    /// Revokes every active refresh token of a user
    ///
    /// Returns how many records moved to revoked. Already revoked records are
    /// left as they are.
    pub async fn revoke_all_for_user(&self, user_id: UserId) -> Result<usize, DomainError> {
        let active = self.repository.list_active_for_user(user_id).await?;

        let mut revoked = 0;
        for token in &active {
            if self.repository.mark_revoked(token).await? {
                revoked += 1;
            }
        }

        info!(user_id, revoked, "Revoked refresh tokens");
        Ok(revoked)
    }

    /// Verifies an access token's signature, issuer, audience and time window
    ///
    /// No server-side state is consulted.
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, DomainError> {
        let data = decode::<AccessClaims>(token, self.keys.decoding_key(), &self.validation)
            .map_err(|e| DomainError::Token(map_jwt_error(e.kind())))?;

        if data.claims.user_id().is_err() {
            return Err(TokenError::InvalidClaims.into());
        }

        Ok(data.claims)
    }

    /// Signs arbitrary claims with the service key
    pub fn sign_claims(&self, claims: &AccessClaims) -> Result<String, DomainError> {
        let header = Header::new(self.keys.algorithm());
        encode(&header, claims, self.keys.encoding_key())
            .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))
    }

    fn generate_access_token(&self, identity: &Identity) -> Result<String, DomainError> {
        let claims = AccessClaims::new(
            identity,
            &self.config.issuer,
            &self.config.audience,
            self.config.access_token_lifetime,
        );
        self.sign_claims(&claims)
    }

    async fn store_new_refresh_token(&self, user_id: UserId) -> Result<RefreshToken, DomainError> {
        for attempt in 1..=MAX_INSERT_ATTEMPTS {
            let record = RefreshToken::new(
                user_id,
                generate_refresh_token_value(),
                self.config.refresh_token_lifetime,
            );

            match self.repository.insert(record).await {
                Ok(saved) => return Ok(saved),
                Err(DomainError::Token(TokenError::DuplicateToken)) => {
                    warn!(user_id, attempt, "Refresh token value collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(TokenError::DuplicateToken.into())
    }
}

/// Opaque refresh token value: 256 bits from the OS RNG, hex encoded
pub fn generate_refresh_token_value() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn map_jwt_error(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::ExpiredSignature => TokenError::TokenExpired,
        ErrorKind::ImmatureSignature => TokenError::TokenNotYetValid,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
        ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidSubject
        | ErrorKind::MissingRequiredClaim(_)
        | ErrorKind::Json(_) => TokenError::InvalidClaims,
        _ => TokenError::InvalidTokenFormat,
    }
}
