//! Refresh token repository trait defining the interface for refresh token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::identity::UserId;
use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainError;

/// Repository trait for [`RefreshToken`] persistence operations
///
/// "Active" means not revoked. Expiry is checked by the caller so that
/// expired but unrevoked records stay inspectable.
///
/// Implementations must enforce uniqueness of the token value at the storage
/// layer and report a collision as `TokenError::DuplicateToken`.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Persist a new refresh token record
    ///
    /// # Returns
    /// * `Ok(RefreshToken)` - The stored record
    /// * `Err(DomainError::Token(TokenError::DuplicateToken))` - The value already exists
    /// * `Err(DomainError)` - Storage failure
    ///
    /// # Example
    /// ```no_run
    /// # use chrono::Duration;
    /// # use fc_core::repositories::RefreshTokenRepository;
    /// # use fc_core::domain::entities::token::RefreshToken;
    /// # async fn example(repo: &impl RefreshTokenRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// let token = RefreshToken::new(42, "9f1c...".to_string(), Duration::days(30));
    /// let saved = repo.insert(token).await?;
    /// println!("Refresh token stored with ID: {}", saved.id);
    /// # Ok(())
    /// # }
    /// ```
    async fn insert(&self, token: RefreshToken) -> Result<RefreshToken, DomainError>;

    /// Find a non-revoked record by its exact token value
    ///
    /// # Returns
    /// * `Ok(Some(RefreshToken))` - Record found and not revoked (it may be expired)
    /// * `Ok(None)` - No such value, or the record was revoked
    /// * `Err(DomainError)` - Storage failure
    async fn find_active_by_value(&self, value: &str) -> Result<Option<RefreshToken>, DomainError>;

    /// All non-revoked records owned by `user_id`, expired ones included
    async fn list_active_for_user(&self, user_id: UserId) -> Result<Vec<RefreshToken>, DomainError>;

    /// Mark a record revoked
    ///
    /// # Returns
    /// * `Ok(true)` - The record moved from active to revoked
    /// * `Ok(false)` - It was already revoked or no longer exists
    async fn mark_revoked(&self, token: &RefreshToken) -> Result<bool, DomainError>;

    /// Delete records whose expiry lies before `cutoff`
    ///
    /// Returns the number of deleted records.
    async fn purge_expired_before(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError>;

    /// Number of non-revoked records owned by `user_id`
    async fn count_active_for_user(&self, user_id: UserId) -> Result<usize, DomainError> {
        let tokens = self.list_active_for_user(user_id).await?;
        Ok(tokens.len())
    }
}
