//! Password rules enforced when an identity is created.

use fc_shared::PasswordPolicyConfig;

use crate::domain::entities::identity::NewIdentity;
use crate::errors::{AuthError, DomainError};

#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    min_length: usize,
    require_digit: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::from(&PasswordPolicyConfig::default())
    }
}

impl From<&PasswordPolicyConfig> for PasswordPolicy {
    fn from(config: &PasswordPolicyConfig) -> Self {
        Self {
            min_length: config.min_length,
            require_digit: config.require_digit,
        }
    }
}

impl PasswordPolicy {
    /// Reasons `password` is refused; empty when it is acceptable
    pub fn violations(&self, password: &str) -> Vec<String> {
        let mut reasons = Vec::new();

        if password.chars().count() < self.min_length {
            reasons.push(format!(
                "Passwords must be at least {} characters.",
                self.min_length
            ));
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            reasons.push("Passwords must have at least one digit ('0'-'9').".to_string());
        }

        reasons
    }

    /// Validates a registration, producing the store's rejection error
    pub fn check(&self, identity: &NewIdentity) -> Result<(), DomainError> {
        let reasons = self.violations(&identity.password);
        if reasons.is_empty() {
            Ok(())
        } else {
            Err(AuthError::RegistrationRejected { reasons }.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_accepts_short_password_with_digit() {
        assert!(PasswordPolicy::default().violations("secret1").is_empty());
    }

    #[test]
    fn test_reports_every_violation() {
        let reasons = PasswordPolicy::default().violations("abc");
        assert_eq!(reasons.len(), 2);
        assert!(reasons[0].contains("at least 6 characters"));
        assert!(reasons[1].contains("one digit"));
    }

    #[test]
    fn test_digit_rule_can_be_disabled() {
        let policy = PasswordPolicy::from(&PasswordPolicyConfig {
            min_length: 4,
            require_digit: false,
        });
        assert!(policy.violations("abcd").is_empty());
    }

    #[test]
    fn test_check_wraps_reasons() {
        let err = PasswordPolicy::default()
            .check(&NewIdentity::new("a@x.com", "short", "", ""))
            .unwrap_err();
        match err {
            DomainError::Auth(AuthError::RegistrationRejected { reasons }) => {
                assert_eq!(reasons.len(), 2)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
