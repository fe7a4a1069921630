//! Identity entity representing a registered club member.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier assigned by the credential store
pub type UserId = i64;

/// A registered identity as seen by the session layer
///
/// Owned by the credential store; the token core only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Unique identifier for the user
    pub id: UserId,

    /// Login email, stored lowercased
    pub email: String,

    pub first_name: String,

    pub last_name: String,

    /// Account balance in minor units (cents)
    pub balance_cents: i64,

    /// Timestamp when the identity was created
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// Balance in major currency units
    pub fn balance(&self) -> f64 {
        self.balance_cents as f64 / 100.0
    }

    /// Display name, falling back to the email when no name was given
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }
}

/// Registration input handed to the credential store
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl NewIdentity {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

/// Canonical form used for email lookups and uniqueness
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
