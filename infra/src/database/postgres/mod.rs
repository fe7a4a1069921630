//! PostgreSQL repository implementations

pub mod credential_store;
pub mod refresh_token_repository;

pub use credential_store::PgCredentialStore;
pub use refresh_token_repository::PgRefreshTokenRepository;
