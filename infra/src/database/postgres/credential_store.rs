//! PostgreSQL credential store with bcrypt password hashes.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use fc_core::domain::entities::identity::{normalize_email, Identity, NewIdentity, UserId};
use fc_core::errors::{AuthError, DomainError};
use fc_core::repositories::identity::hashing;
use fc_core::repositories::{CredentialStore, DecoyHash, PasswordPolicy};

use crate::database::{db_error, is_unique_violation};

const COLUMNS: &str = "id, email, first_name, last_name, balance_cents, created_at";

/// Identities stored in the `users` table
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
    policy: PasswordPolicy,
    cost: u32,
    decoy: Arc<DecoyHash>,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool, policy: PasswordPolicy) -> Self {
        Self {
            pool,
            policy,
            cost: bcrypt::DEFAULT_COST,
            decoy: Arc::new(DecoyHash::new(bcrypt::DEFAULT_COST)),
        }
    }

    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self.decoy = Arc::new(DecoyHash::new(cost));
        self
    }

    fn row_to_identity(row: &PgRow) -> Result<Identity, DomainError> {
        let get_err = |column: &str, e: sqlx::Error| {
            DomainError::internal(format!("Failed to get {}: {}", column, e))
        };

        Ok(Identity {
            id: row.try_get("id").map_err(|e| get_err("id", e))?,
            email: row.try_get("email").map_err(|e| get_err("email", e))?,
            first_name: row.try_get("first_name").map_err(|e| get_err("first_name", e))?,
            last_name: row.try_get("last_name").map_err(|e| get_err("last_name", e))?,
            balance_cents: row
                .try_get("balance_cents")
                .map_err(|e| get_err("balance_cents", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| get_err("created_at", e))?,
        })
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, DomainError> {
        let query = format!("SELECT {} FROM users WHERE email = $1", COLUMNS);

        let row = sqlx::query(&query)
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find user by email", e))?;

        row.as_ref().map(Self::row_to_identity).transpose()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>, DomainError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", COLUMNS);

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find user by id", e))?;

        row.as_ref().map(Self::row_to_identity).transpose()
    }

    async fn create(&self, new_identity: NewIdentity) -> Result<Identity, DomainError> {
        self.policy.check(&new_identity)?;

        let password_hash = hashing::hash_password(&new_identity.password, self.cost).await?;

        let email = normalize_email(&new_identity.email);
        let query = format!(
            "INSERT INTO users (email, password_hash, first_name, last_name) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(&email)
            .bind(&password_hash)
            .bind(&new_identity.first_name)
            .bind(&new_identity.last_name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AuthError::RegistrationRejected {
                        reasons: vec![format!("Email '{}' is already taken.", email)],
                    }
                    .into()
                } else {
                    db_error("Failed to create user", e)
                }
            })?;

        Self::row_to_identity(&row)
    }

    async fn verify_password(&self, identity: &Identity, password: &str) -> Result<bool, DomainError> {
        let hash: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE id = $1")
                .bind(identity.id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to load password hash", e))?;

        let Some(hash) = hash else {
            return Ok(false);
        };

        hashing::verify_password(password, hash).await
    }

    async fn verify_decoy(&self, password: &str) -> Result<(), DomainError> {
        self.decoy.verify(password).await
    }
}
