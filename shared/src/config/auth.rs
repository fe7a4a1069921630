//! Authentication configuration: token signing, lifetimes, password policy

use serde::{Deserialize, Serialize};

use super::{env_bool, env_or};

/// Secret used when `JWT_SECRET` is not set. Long enough to pass the key
/// length check so development works out of the box.
pub const DEFAULT_DEV_SECRET: &str = "development-secret-please-change-in-production";

/// JWT authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Signing secret, either base64 or raw UTF-8 (at least 256 bits)
    pub secret: String,

    /// Access token lifetime in seconds
    pub access_token_expiry: i64,

    /// Refresh token lifetime in seconds
    pub refresh_token_expiry: i64,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,

    /// Issue a fresh refresh token on every renewal and revoke the old one
    #[serde(default)]
    pub rotate_refresh_tokens: bool,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_DEV_SECRET),
            access_token_expiry: 900,        // 15 minutes
            refresh_token_expiry: 2_592_000, // 30 days
            issuer: String::from("fitness_club"),
            audience: String::from("fitness_club_client"),
            rotate_refresh_tokens: false,
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Enable or disable refresh token rotation
    pub fn with_rotation(mut self, rotate: bool) -> Self {
        self.rotate_refresh_tokens = rotate;
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_DEV_SECRET
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            secret: std::env::var("JWT_SECRET").unwrap_or(defaults.secret),
            access_token_expiry: env_or("JWT_ACCESS_TOKEN_EXPIRY", defaults.access_token_expiry),
            refresh_token_expiry: env_or("JWT_REFRESH_TOKEN_EXPIRY", defaults.refresh_token_expiry),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or(defaults.audience),
            rotate_refresh_tokens: env_bool("JWT_ROTATE_REFRESH_TOKENS", false),
        }
    }
}

/// Rules applied by the credential store when creating an identity
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PasswordPolicyConfig {
    /// Minimum password length in characters
    pub min_length: usize,

    /// Require at least one ASCII digit
    pub require_digit: bool,
}

impl Default for PasswordPolicyConfig {
    fn default() -> Self {
        Self {
            min_length: 6,
            require_digit: true,
        }
    }
}

impl PasswordPolicyConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            min_length: env_or("PASSWORD_MIN_LENGTH", defaults.min_length),
            require_digit: env_bool("PASSWORD_REQUIRE_DIGIT", defaults.require_digit),
        }
    }
}

/// Background purge of refresh token records that expired long ago
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshPurgeConfig {
    /// Whether the purge task runs at all
    pub enabled: bool,

    /// How often to run the purge, in seconds
    pub interval_seconds: u64,

    /// How long expired records are kept for audit before deletion, in days
    pub retention_days: i64,
}

impl Default for RefreshPurgeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_seconds: 3600,
            retention_days: 30,
        }
    }
}

impl RefreshPurgeConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_bool("REFRESH_PURGE_ENABLED", defaults.enabled),
            interval_seconds: env_or("REFRESH_PURGE_INTERVAL", defaults.interval_seconds),
            retention_days: env_or("REFRESH_PURGE_RETENTION_DAYS", defaults.retention_days),
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Password policy for new identities
    #[serde(default)]
    pub password: PasswordPolicyConfig,

    /// Expired refresh token purge
    #[serde(default)]
    pub purge: RefreshPurgeConfig,
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            jwt: JwtConfig::from_env(),
            password: PasswordPolicyConfig::from_env(),
            purge: RefreshPurgeConfig::from_env(),
        }
    }
}
