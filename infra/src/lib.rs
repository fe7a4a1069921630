//! # Infrastructure Layer
//!
//! Concrete persistence for the FitClub session core:
//! - **Database**: PostgreSQL connection pool and migrations (SQLx)
//! - **Repositories**: refresh token store and bcrypt-backed credential store

pub mod database;

pub use database::{DatabasePool, PgCredentialStore, PgRefreshTokenRepository, PoolStatistics};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
