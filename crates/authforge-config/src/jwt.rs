//! Token signing configuration.
//!
//! # Environment Variables
//!
//! - `JWT_KEY`: HMAC secret used to sign tokens
//! - `JWT_ISSUER`: value written to the `iss` claim
//! - `JWT_AUDIENCE`: value written to the `aud` claim
//! - `JWT_DURATION_IN_DAYS`: token lifetime in whole days (default: 30)

use std::env;

pub const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Clone)]
pub struct JwtConfig {
    pub key: String,
    pub issuer: String,
    pub audience: String,
    pub duration_in_days: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            key: env::var("JWT_KEY")
                .unwrap_or_else(|_| "your-secret-key-change-in-production".to_string()),
            issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "AuthforgeApi".to_string()),
            audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| "AuthforgeUsers".to_string()),
            duration_in_days: env::var("JWT_DURATION_IN_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|days: &i64| *days > 0)
                .unwrap_or(30),
        }
    }

    /// Token lifetime in seconds.
    pub fn lifetime_seconds(&self) -> i64 {
        self.duration_in_days.saturating_mul(SECONDS_PER_DAY)
    }
}

// The signing key never ends up in logs.
impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("key", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("duration_in_days", &self.duration_in_days)
            .finish()
    }
}
