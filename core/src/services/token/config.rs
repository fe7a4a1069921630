//! Configuration for the token service

use chrono::Duration;
use fc_shared::JwtConfig;

use crate::domain::entities::token::{ACCESS_TOKEN_EXPIRY_MINUTES, REFRESH_TOKEN_EXPIRY_DAYS};

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// `iss` claim written and required
    pub issuer: String,
    /// `aud` claim written and required
    pub audience: String,
    /// Access token lifetime
    pub access_token_lifetime: Duration,
    /// Refresh token lifetime
    pub refresh_token_lifetime: Duration,
    /// Replace the refresh token on every renewal and revoke the old one
    pub rotate_refresh_tokens: bool,
    /// Clock skew tolerated when checking `exp` and `nbf`, in seconds
    pub leeway_seconds: u64,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            issuer: "fitness_club".to_string(),
            audience: "fitness_club_client".to_string(),
            access_token_lifetime: Duration::minutes(ACCESS_TOKEN_EXPIRY_MINUTES),
            refresh_token_lifetime: Duration::days(REFRESH_TOKEN_EXPIRY_DAYS),
            rotate_refresh_tokens: false,
            leeway_seconds: 0,
        }
    }
}

impl From<&JwtConfig> for TokenServiceConfig {
    fn from(config: &JwtConfig) -> Self {
        Self {
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_token_lifetime: Duration::seconds(config.access_token_expiry),
            refresh_token_lifetime: Duration::seconds(config.refresh_token_expiry),
            rotate_refresh_tokens: config.rotate_refresh_tokens,
            leeway_seconds: 0,
        }
    }
}

impl TokenServiceConfig {
    pub fn with_rotation(mut self, rotate: bool) -> Self {
        self.rotate_refresh_tokens = rotate;
        self
    }

    /// Access token lifetime in whole seconds, as reported in `expiresIn`
    pub fn access_token_expires_in(&self) -> i64 {
        self.access_token_lifetime.num_seconds()
    }
}
