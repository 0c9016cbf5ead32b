//! # Authforge Auth
//!
//! Token claims and the signing engine for Authforge.
//!
//! - [`claims`]: The JWT payload and custom-claim folding
//! - [`jwt`]: [`TokenIssuer`], which signs and verifies tokens
//!
//! # Token Shape
//!
//! Every token is a compact HS256 JWS. The payload carries:
//!
//! - `sub`: the username
//! - `jti`: a fresh UUID per issuance
//! - `email` and `uid` (internal identifier)
//! - `roles`: one array entry per stored role claim, then per assigned role
//! - the identity's other stored custom claims
//! - `iss`, `aud`, `iat`, `exp`
//!
//! # Example
//!
//! ```ignore
//! use authforge_auth::{TokenIssuer, TokenSubject};
//! use authforge_config::JwtConfig;
//!
//! let issuer = TokenIssuer::new(JwtConfig::from_env());
//! let issued = issuer.issue(TokenSubject {
//!     user_id,
//!     username: "alice",
//!     email: "a@x.com",
//!     roles: &["User".to_string()],
//!     custom_claims: &[],
//! })?;
//!
//! let claims = issuer.verify(&issued.token)?;
//! assert_eq!(claims.sub, "alice");
//! ```

pub mod claims;
pub mod jwt;

// Re-export commonly used types at crate root
pub use claims::{
    FoldedClaims, REGISTERED_CLAIMS, ROLE_CLAIM, TokenClaims, fold_custom_claims, is_issuer_owned,
};
pub use jwt::{IssuedToken, TokenIssuer, TokenSubject};
