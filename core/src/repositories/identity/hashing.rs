//! bcrypt hashing run on the blocking pool.

use tokio::sync::OnceCell;

use crate::errors::DomainError;

/// Lowest work factor bcrypt accepts
pub const MIN_COST: u32 = 4;

/// Hashes `password` at `cost` without blocking the async executor
pub async fn hash_password(password: &str, cost: u32) -> Result<String, DomainError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| DomainError::internal(format!("Password hashing task failed: {}", e)))?
        .map_err(|e| DomainError::internal(format!("Password hashing failed: {}", e)))
}

/// Checks `password` against a stored bcrypt `hash`
pub async fn verify_password(password: &str, hash: String) -> Result<bool, DomainError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| DomainError::internal(format!("Password verification task failed: {}", e)))?
        .map_err(|e| DomainError::internal(format!("Password verification failed: {}", e)))
}

/// A hash no password is expected to match, at the same cost as real ones
///
/// Verifying against it makes a login for an unknown email cost as much as
/// a login with a wrong password.
#[derive(Debug)]
pub struct DecoyHash {
    cost: u32,
    hash: OnceCell<String>,
}

impl DecoyHash {
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            hash: OnceCell::new(),
        }
    }

    /// Runs one full verification and discards the result
    pub async fn verify(&self, password: &str) -> Result<(), DomainError> {
        let hash = self
            .hash
            .get_or_try_init(|| hash_password("fitclub-decoy-credential", self.cost))
            .await?;
        verify_password(password, hash.clone()).await?;
        Ok(())
    }
}
