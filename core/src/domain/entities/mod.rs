//! Domain entities representing core business objects.

pub mod identity;
pub mod token;

// Re-export commonly used types
pub use identity::{Identity, NewIdentity, UserId};
pub use token::{
    AccessClaims, RefreshToken, TokenPair, ACCESS_TOKEN_EXPIRY_MINUTES, REFRESH_TOKEN_EXPIRY_DAYS,
};
