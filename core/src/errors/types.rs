//! Authentication and token error types
//!
//! These describe why a session operation failed. The HTTP layer decides how
//! much of that reason is shown to the caller.

use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong password. The two are deliberately not told apart.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User with this email already exists.")]
    EmailAlreadyRegistered,

    /// The credential store refused to create the identity
    #[error("Registration rejected: {}", reasons.join("; "))]
    RegistrationRejected { reasons: Vec<String> },

    #[error("User not found")]
    UserNotFound,

    #[error("Refresh token is required.")]
    MissingRefreshToken,
}

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token format")]
    InvalidTokenFormat,

    #[error("Token signature verification failed")]
    InvalidSignature,

    #[error("Token not yet valid")]
    TokenNotYetValid,

    #[error("Invalid token claims")]
    InvalidClaims,

    #[error("Refresh token expired")]
    RefreshTokenExpired,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Token generation failed")]
    TokenGenerationFailed,

    /// Storage refused a refresh token value because it already exists
    #[error("Duplicate refresh token value")]
    DuplicateToken,

    #[error("Signing key is invalid: {reason}")]
    InvalidSigningKey { reason: String },
}

impl TokenError {
    /// Whether the error came from verifying a presented access token
    pub fn is_access_token_rejection(&self) -> bool {
        matches!(
            self,
            TokenError::TokenExpired
                | TokenError::InvalidTokenFormat
                | TokenError::InvalidSignature
                | TokenError::TokenNotYetValid
                | TokenError::InvalidClaims
        )
    }
}
