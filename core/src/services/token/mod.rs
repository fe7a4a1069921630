//! Token service module
//!
//! - Access token signing and verification (HS256)
//! - Refresh token issuing, renewal and revocation
//! - Signing key construction
//! - Background purge of long-expired refresh tokens

mod cleanup;
mod config;
mod keys;
mod service;

#[cfg(test)]
mod tests;

pub use cleanup::{CleanupResult, TokenCleanupConfig, TokenCleanupService};
pub use config::TokenServiceConfig;
pub use keys::{SigningKeys, MIN_KEY_BYTES};
pub use service::{generate_refresh_token_value, TokenService};
