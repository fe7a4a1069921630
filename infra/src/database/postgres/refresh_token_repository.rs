//! PostgreSQL implementation of the RefreshTokenRepository trait.
//!
//! Uniqueness of the token value is enforced by `ux_refresh_tokens_token`;
//! a violation surfaces as `TokenError::DuplicateToken`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use fc_core::domain::entities::identity::UserId;
use fc_core::domain::entities::token::RefreshToken;
use fc_core::errors::{DomainError, TokenError};
use fc_core::repositories::RefreshTokenRepository;

use crate::database::{db_error, is_unique_violation};

const COLUMNS: &str = "id, user_id, token, created_at, expires_at, is_revoked";

/// PostgreSQL implementation of RefreshTokenRepository
#[derive(Clone)]
pub struct PgRefreshTokenRepository {
    pool: PgPool,
}

impl PgRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_token(row: &PgRow) -> Result<RefreshToken, DomainError> {
        let get_err = |column: &str, e: sqlx::Error| {
            DomainError::internal(format!("Failed to get {}: {}", column, e))
        };

        Ok(RefreshToken {
            id: row.try_get("id").map_err(|e| get_err("id", e))?,
            user_id: row.try_get("user_id").map_err(|e| get_err("user_id", e))?,
            token: row.try_get("token").map_err(|e| get_err("token", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| get_err("created_at", e))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| get_err("expires_at", e))?,
            is_revoked: row.try_get("is_revoked").map_err(|e| get_err("is_revoked", e))?,
        })
    }
}

#[async_trait]
impl RefreshTokenRepository for PgRefreshTokenRepository {
    async fn insert(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        let query = r#"
            INSERT INTO refresh_tokens (
                id, user_id, token, created_at, expires_at, is_revoked
            ) VALUES ($1, $2, $3, $4, $5, $6)
        "#;

        sqlx::query(query)
            .bind(token.id)
            .bind(token.user_id)
            .bind(&token.token)
            .bind(token.created_at)
            .bind(token.expires_at)
            .bind(token.is_revoked)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::Token(TokenError::DuplicateToken)
                } else {
                    db_error("Failed to save refresh token", e)
                }
            })?;

        Ok(token)
    }

    async fn find_active_by_value(&self, value: &str) -> Result<Option<RefreshToken>, DomainError> {
        let query = format!(
            "SELECT {} FROM refresh_tokens WHERE token = $1 AND is_revoked = FALSE LIMIT 1",
            COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find refresh token", e))?;

        row.as_ref().map(Self::row_to_token).transpose()
    }

    async fn list_active_for_user(&self, user_id: UserId) -> Result<Vec<RefreshToken>, DomainError> {
        let query = format!(
            "SELECT {} FROM refresh_tokens WHERE user_id = $1 AND is_revoked = FALSE ORDER BY created_at",
            COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list user tokens", e))?;

        rows.iter().map(Self::row_to_token).collect()
    }

    async fn mark_revoked(&self, token: &RefreshToken) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET is_revoked = TRUE WHERE id = $1 AND is_revoked = FALSE",
        )
        .bind(token.id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to revoke refresh token", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired_before(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to purge refresh tokens", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn count_active_for_user(&self, user_id: UserId) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM refresh_tokens WHERE user_id = $1 AND is_revoked = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to count user tokens", e))?;

        Ok(count as usize)
    }
}
