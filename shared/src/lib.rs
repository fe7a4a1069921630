//! Shared configuration and common types for the FitClub workspace
//!
//! This crate provides functionality used by the server and client crates:
//! - Configuration types loaded from environment variables
//! - Error response structures used on the wire

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, ClientConfig, CorsConfig, DatabaseConfig, Environment, JwtConfig,
    LoggingConfig, PasswordPolicyConfig, RefreshPurgeConfig, ServerConfig,
};
pub use errors::{error_codes, ErrorResponse, FieldErrors, ValidationErrorResponse};
