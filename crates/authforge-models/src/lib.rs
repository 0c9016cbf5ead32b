//! # Authforge Models
//!
//! Domain models and DTOs for Authforge.
//!
//! # Modules
//!
//! - [`auth`]: Request DTOs, the [`AuthResult`] envelope and the [`AuthFailure`] taxonomy
//! - [`roles`]: The default role name
//! - [`users`]: Identity records and stored custom claims
//!
//! # Example
//!
//! ```ignore
//! use authforge_models::{AuthFailure, AuthResult};
//!
//! let result = AuthResult::from(AuthFailure::InvalidCredentials);
//! assert!(!result.is_authenticated);
//! assert_eq!(result.message.as_deref(), Some("Email Or Password is incorrect"));
//! ```

pub mod auth;
pub mod roles;
pub mod users;

// Re-export commonly used types at crate root for convenience
pub use auth::{AddRoleRequest, AuthFailure, AuthResult, RegisterRequest, TokenRequest};
pub use roles::DEFAULT_ROLE;
pub use users::{Identity, NewIdentity, UserClaim};
