//! Database module - PostgreSQL implementations using SQLx

pub mod connection;
pub mod postgres;


// Re-export commonly used types
pub use connection::{DatabasePool, PoolStatistics};
pub use postgres::{PgCredentialStore, PgRefreshTokenRepository};

use fc_core::errors::DomainError;

/// Whether the error is a unique constraint violation
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

/// Wraps a driver error as an internal domain error
pub(crate) fn db_error(context: &str, error: sqlx::Error) -> DomainError {
    tracing::error!("{}: {}", context, error);
    DomainError::internal(format!("{}: {}", context, error))
}
