//! Domain-specific error types and error handling.

mod types;


pub use types::{AuthError, TokenError};

use fc_shared::FieldErrors;
use thiserror::Error;

/// Core domain errors
///
/// Every failure a session operation can produce. [`DomainError::category`]
/// folds these into the small set of outcomes the HTTP layer renders.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation failed")]
    ValidationFailed { errors: FieldErrors },

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Externally visible outcome of a failed operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    ValidationFailed,
    Unauthorized,
    BadRequest,
    Conflict,
    NotFound,
    Internal,
}

impl DomainError {
    pub fn internal(message: impl Into<String>) -> Self {
        DomainError::Internal {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        DomainError::BadRequest {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        DomainError::NotFound {
            resource: resource.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DomainError::ValidationFailed { .. } => ErrorCategory::ValidationFailed,
            DomainError::Unauthorized => ErrorCategory::Unauthorized,
            DomainError::BadRequest { .. } => ErrorCategory::BadRequest,
            DomainError::Conflict { .. } => ErrorCategory::Conflict,
            DomainError::NotFound { .. } => ErrorCategory::NotFound,
            DomainError::Internal { .. } => ErrorCategory::Internal,
            DomainError::Auth(err) => match err {
                AuthError::InvalidCredentials => ErrorCategory::Unauthorized,
                AuthError::EmailAlreadyRegistered => ErrorCategory::Conflict,
                AuthError::RegistrationRejected { .. } => ErrorCategory::ValidationFailed,
                AuthError::UserNotFound => ErrorCategory::NotFound,
                AuthError::MissingRefreshToken => ErrorCategory::BadRequest,
            },
            DomainError::Token(err) => match err {
                TokenError::TokenGenerationFailed
                | TokenError::DuplicateToken
                | TokenError::InvalidSigningKey { .. } => ErrorCategory::Internal,
                _ => ErrorCategory::Unauthorized,
            },
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
