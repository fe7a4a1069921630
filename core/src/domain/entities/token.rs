//! Token entities for JWT-based authentication.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::identity::{Identity, UserId};

/// Access token expiration time (15 minutes)
pub const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 15;

/// Refresh token expiration time (30 days)
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 30;

/// Claims carried by an access token
///
/// Fixed structure; anything not listed here is rejected at decode time by
/// the type, not by a claims bag lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (identity id)
    pub sub: String,

    /// Email of the identity at issue time
    pub email: String,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// JWT ID (unique identifier for the token)
    pub jti: String,
}

impl AccessClaims {
    /// Creates claims for `identity` valid from now for `lifetime`
    pub fn new(identity: &Identity, issuer: &str, audience: &str, lifetime: Duration) -> Self {
        Self::issued_at(identity, issuer, audience, Utc::now(), lifetime)
    }

    /// Creates claims with an explicit issue instant
    pub fn issued_at(
        identity: &Identity,
        issuer: &str,
        audience: &str,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        let expiry = issued_at + lifetime;

        Self {
            sub: identity.id.to_string(),
            email: identity.email.clone(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            iat: issued_at.timestamp(),
            nbf: issued_at.timestamp(),
            exp: expiry.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Gets the identity id from the subject claim
    pub fn user_id(&self) -> Result<UserId, std::num::ParseIntError> {
        self.sub.parse()
    }
}

/// Refresh token record stored in the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    /// Unique identifier for the record
    pub id: Uuid,

    /// Identity this token belongs to
    pub user_id: UserId,

    /// Opaque token value handed to the client, unique across all records
    pub token: String,

    /// Timestamp when the token was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the token expires
    pub expires_at: DateTime<Utc>,

    /// Whether the token has been revoked
    pub is_revoked: bool,
}

impl RefreshToken {
    /// Creates a new, unrevoked refresh token expiring after `lifetime`
    pub fn new(user_id: UserId, token: String, lifetime: Duration) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            user_id,
            token,
            created_at: now,
            expires_at: now + lifetime,
            is_revoked: false,
        }
    }

    /// Checks if the refresh token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// A token can be exchanged for a new access token only while it is
    /// neither revoked nor expired
    pub fn is_usable(&self) -> bool {
        !self.is_revoked && !self.is_expired()
    }

    /// Revokes the refresh token
    pub fn revoke(&mut self) {
        self.is_revoked = true;
    }
}

/// Token pair returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Signed access token
    pub access_token: String,

    /// Opaque refresh token
    pub refresh_token: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,
}

impl TokenPair {
    pub fn new(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_in,
        }
    }
}
