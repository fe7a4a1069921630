//! Repository interfaces and their in-memory implementations.

pub mod identity;
pub mod token;

pub use identity::{CredentialStore, DecoyHash, InMemoryCredentialStore, PasswordPolicy};
pub use token::{InMemoryRefreshTokenRepository, RefreshTokenRepository};
