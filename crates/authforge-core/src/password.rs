//! Password hashing and the account password policy.
//!
//! Hashing uses bcrypt at [`DEFAULT_COST`]. bcrypt only reads the first
//! [`MAX_PASSWORD_BYTES`] bytes of its input, so the non-truncating variants
//! are used and the policy refuses anything longer. The policy is evaluated
//! by the identity stores before a record is created; every violated rule
//! yields one human-readable description, in a fixed rule order.

use anyhow::anyhow;
use bcrypt::{DEFAULT_COST, non_truncating_hash, non_truncating_verify};

use crate::errors::AppError;

/// Longest password bcrypt can hash without truncation.
pub const MAX_PASSWORD_BYTES: usize = 72;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash_password_with_cost(password, DEFAULT_COST)
}

/// Hashes with an explicit bcrypt cost (4..=31). Low costs are for tests only.
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AppError> {
    non_truncating_hash(password, cost)
        .map_err(|e| AppError::internal(anyhow!("Failed to hash password: {}", e)))
}

/// Checks `password` against a bcrypt hash.
///
/// A password over [`MAX_PASSWORD_BYTES`] never matches: no such password
/// can have been hashed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Ok(false);
    }
    non_truncating_verify(password, hash)
        .map_err(|e| AppError::internal(anyhow!("Failed to verify password: {}", e)))
}

/// Character-class and length rules a new password must satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub required_length: usize,
    pub require_non_alphanumeric: bool,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            required_length: 4,
            require_non_alphanumeric: true,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
        }
    }
}

impl PasswordPolicy {
    /// Returns one description per violated rule. Empty means the password is acceptable.
    pub fn validate(&self, password: &str) -> Vec<String> {
        let mut errors = Vec::new();

        if password.chars().count() < self.required_length {
            errors.push(format!(
                "Passwords must be at least {} characters.",
                self.required_length
            ));
        }
        if self.require_non_alphanumeric && password.chars().all(|c| c.is_alphanumeric()) {
            errors.push("Passwords must have at least one non alphanumeric character.".to_string());
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push("Passwords must have at least one digit ('0'-'9').".to_string());
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
            errors.push("Passwords must have at least one lowercase ('a'-'z').".to_string());
        }
        if self.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            errors.push("Passwords must have at least one uppercase ('A'-'Z').".to_string());
        }
        if password.len() > MAX_PASSWORD_BYTES {
            errors.push(format!(
                "Passwords must be at most {} bytes.",
                MAX_PASSWORD_BYTES
            ));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_low_cost() {
        let hash = hash_password_with_cost("Pw1!", 4).unwrap();
        assert_ne!(hash, "Pw1!");
        assert!(verify_password("Pw1!", &hash).unwrap());
        assert!(!verify_password("pw1!", &hash).unwrap());
    }

    #[test]
    fn test_suffix_past_bcrypt_limit_does_not_verify() {
        let password = format!("Pw1!{}", "a".repeat(MAX_PASSWORD_BYTES - 4));
        let hash = hash_password_with_cost(&password, 4).unwrap();

        assert!(verify_password(&password, &hash).unwrap());
        assert!(!verify_password(&format!("{password}XYZ"), &hash).unwrap());
    }

    #[test]
    fn test_overlong_password_cannot_be_hashed() {
        let password = format!("Pw1!{}", "a".repeat(80));
        assert!(hash_password_with_cost(&password, 4).is_err());
    }

    #[test]
    fn test_policy_rejects_overlong_password() {
        let errors = PasswordPolicy::default().validate(&format!("Pw1!{}", "a".repeat(80)));
        assert_eq!(errors, vec!["Passwords must be at most 72 bytes.".to_string()]);
        assert!(
            PasswordPolicy::default()
                .validate(&format!("Pw1!{}", "a".repeat(68)))
                .is_empty()
        );
    }

    #[test]
    fn test_invalid_cost_is_an_error() {
        assert!(hash_password_with_cost("Pw1!", 2).is_err());
    }

    #[test]
    fn test_verify_against_malformed_hash_is_an_error() {
        assert!(verify_password("Pw1!", "not_a_valid_bcrypt_hash").is_err());
    }

    #[test]
    fn test_default_policy_accepts_strong_password() {
        assert!(PasswordPolicy::default().validate("Pw1!").is_empty());
    }

    #[test]
    fn test_rule_order_is_stable() {
        let errors = PasswordPolicy::default().validate("");
        assert_eq!(errors.len(), 5);
        assert!(errors[0].contains("at least 4 characters"));
        assert!(errors[1].contains("non alphanumeric"));
        assert!(errors[2].contains("digit"));
        assert!(errors[3].contains("lowercase"));
        assert!(errors[4].contains("uppercase"));
    }

    #[test]
    fn test_relaxed_policy() {
        let policy = PasswordPolicy {
            required_length: 1,
            require_non_alphanumeric: false,
            require_digit: false,
            require_lowercase: false,
            require_uppercase: false,
        };
        assert!(policy.validate("a").is_empty());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let policy = PasswordPolicy {
            required_length: 4,
            require_non_alphanumeric: false,
            require_digit: false,
            require_lowercase: false,
            require_uppercase: false,
        };
        // three characters, six bytes
        assert_eq!(policy.validate("äöü").len(), 1);
    }
}
