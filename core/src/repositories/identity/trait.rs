//! Credential store trait: the identity source the session layer reads from.

use async_trait::async_trait;

use crate::domain::entities::identity::{Identity, NewIdentity, UserId};
use crate::errors::DomainError;

/// Repository trait for identities and their password credentials
///
/// The session layer never sees password hashes. It asks the store to
/// create an identity and to check a candidate password.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find an identity by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, DomainError>;

    /// Find an identity by id
    async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>, DomainError>;

    /// Create an identity
    ///
    /// # Returns
    /// * `Ok(Identity)` - The created identity
    /// * `Err(DomainError::Auth(AuthError::RegistrationRejected { .. }))` - Input refused by
    ///   the store's password policy or a concurrent registration took the email
    /// * `Err(DomainError)` - Storage failure
    async fn create(&self, identity: NewIdentity) -> Result<Identity, DomainError>;

    /// Check `password` against the stored credential of `identity`
    async fn verify_password(&self, identity: &Identity, password: &str) -> Result<bool, DomainError>;

    /// Spend the cost of one password check without an identity
    ///
    /// Called for an unknown email so that the failure takes as long as a
    /// wrong password does.
    async fn verify_decoy(&self, password: &str) -> Result<(), DomainError>;
}
