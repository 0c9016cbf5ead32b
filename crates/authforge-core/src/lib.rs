//! # Authforge Core
//!
//! Core types and utilities shared by every Authforge crate.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`password`]: bcrypt hashing/verification and the account password policy
//! - [`serde`]: Custom serde helpers for token payloads
//!
//! # Example
//!
//! ```ignore
//! use authforge_core::{AppError, PasswordPolicy, hash_password, verify_password};
//!
//! let problems = PasswordPolicy::default().validate("weak");
//! assert_eq!(problems.len(), 3);
//!
//! let hash = hash_password("Pw1!xx")?;
//! assert!(verify_password("Pw1!xx", &hash)?);
//! ```

pub mod errors;
pub mod password;
pub mod serde;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use password::{
    MAX_PASSWORD_BYTES, PasswordPolicy, hash_password, hash_password_with_cost, verify_password,
};
