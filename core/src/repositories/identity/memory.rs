//! In-memory credential store backed by bcrypt hashes

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::identity::{normalize_email, Identity, NewIdentity, UserId};
use crate::errors::{AuthError, DomainError};

use super::hashing::{self, DecoyHash, MIN_COST};
use super::policy::PasswordPolicy;
use super::r#trait::CredentialStore;

struct StoredIdentity {
    identity: Identity,
    password_hash: String,
}

#[derive(Default)]
struct State {
    next_id: UserId,
    by_id: HashMap<UserId, StoredIdentity>,
}

/// Credential store kept in process memory
///
/// Hashes with the minimum bcrypt cost unless told otherwise, which keeps
/// tests fast.
#[derive(Clone)]
pub struct InMemoryCredentialStore {
    state: Arc<RwLock<State>>,
    policy: PasswordPolicy,
    cost: u32,
    decoy: Arc<DecoyHash>,
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            policy: PasswordPolicy::default(),
            cost: MIN_COST,
            decoy: Arc::new(DecoyHash::new(MIN_COST)),
        }
    }

    pub fn with_policy(mut self, policy: PasswordPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self.decoy = Arc::new(DecoyHash::new(cost));
        self
    }

    /// Removes an identity, leaving any refresh tokens it owns behind
    pub async fn remove(&self, id: UserId) -> bool {
        self.state.write().await.by_id.remove(&id).is_some()
    }

    /// Sets the balance of an identity in cents
    pub async fn set_balance_cents(&self, id: UserId, balance_cents: i64) -> bool {
        match self.state.write().await.by_id.get_mut(&id) {
            Some(stored) => {
                stored.identity.balance_cents = balance_cents;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, DomainError> {
        let email = normalize_email(email);
        let state = self.state.read().await;
        Ok(state
            .by_id
            .values()
            .find(|s| s.identity.email == email)
            .map(|s| s.identity.clone()))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>, DomainError> {
        let state = self.state.read().await;
        Ok(state.by_id.get(&id).map(|s| s.identity.clone()))
    }

    async fn create(&self, new_identity: NewIdentity) -> Result<Identity, DomainError> {
        self.policy.check(&new_identity)?;

        let password_hash = hashing::hash_password(&new_identity.password, self.cost).await?;
        let email = normalize_email(&new_identity.email);

        let mut state = self.state.write().await;
        if state.by_id.values().any(|s| s.identity.email == email) {
            return Err(AuthError::RegistrationRejected {
                reasons: vec![format!("Email '{}' is already taken.", email)],
            }
            .into());
        }

        state.next_id += 1;
        let identity = Identity {
            id: state.next_id,
            email,
            first_name: new_identity.first_name,
            last_name: new_identity.last_name,
            balance_cents: 0,
            created_at: Utc::now(),
        };
        state.by_id.insert(
            identity.id,
            StoredIdentity {
                identity: identity.clone(),
                password_hash,
            },
        );

        Ok(identity)
    }

    async fn verify_password(&self, identity: &Identity, password: &str) -> Result<bool, DomainError> {
        let hash = {
            let state = self.state.read().await;
            match state.by_id.get(&identity.id) {
                Some(stored) => stored.password_hash.clone(),
                None => return Ok(false),
            }
        };

        hashing::verify_password(password, hash).await
    }

    async fn verify_decoy(&self, password: &str) -> Result<(), DomainError> {
        self.decoy.verify(password).await
    }
}
