//! # FitClub Core
//!
//! Core business logic for the FitClub session lifecycle.
//! This crate contains domain entities, the token issuer, the session service,
//! repository interfaces, and error types that the API and infrastructure
//! layers build on.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{
    AccessClaims, Identity, NewIdentity, RefreshToken, TokenPair, UserId,
    ACCESS_TOKEN_EXPIRY_MINUTES, REFRESH_TOKEN_EXPIRY_DAYS,
};
pub use errors::{AuthError, DomainError, DomainResult, ErrorCategory, TokenError};
pub use repositories::{
    CredentialStore, InMemoryCredentialStore, InMemoryRefreshTokenRepository, PasswordPolicy,
    RefreshTokenRepository,
};
pub use services::{
    CleanupResult, SessionService, SigningKeys, TokenCleanupConfig, TokenCleanupService,
    TokenService, TokenServiceConfig,
};
