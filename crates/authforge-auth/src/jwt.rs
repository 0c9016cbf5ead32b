//! Token signing and verification.
//!
//! [`TokenIssuer`] owns an immutable [`JwtConfig`] and the HMAC keys derived
//! from it. Issuance samples the clock and a fresh `jti` on every call;
//! everything else in the token is a pure function of its inputs, so
//! [`TokenIssuer::sign`] produces identical bytes for identical claims.

use anyhow::anyhow;
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use authforge_config::JwtConfig;
use authforge_core::AppError;

use crate::claims::{TokenClaims, fold_custom_claims};

/// The verified identity a token is issued for.
#[derive(Debug, Clone, Copy)]
pub struct TokenSubject<'a> {
    pub user_id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub roles: &'a [String],
    pub custom_claims: &'a [(String, String)],
}

/// A signed token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact serialized form (`header.payload.signature`)
    pub token: String,
    pub claims: TokenClaims,
    /// Roles held at issuance, without stored role claims
    pub roles: Vec<String>,
    /// `exp` as a timestamp
    pub expires_on: DateTime<Utc>,
}

pub struct TokenIssuer {
    config: JwtConfig,
    header: Header,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.key.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.key.as_bytes());

        Self {
            config,
            header: Header::new(Algorithm::HS256),
            encoding_key,
            decoding_key,
        }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// Issues a token for `subject`, valid for the configured number of days.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the expiry overflows the timestamp range
    /// or encoding fails.
    pub fn issue(&self, subject: TokenSubject<'_>) -> Result<IssuedToken, AppError> {
        let roles = subject.roles.to_vec();
        let claims = self.build_claims(subject, Utc::now(), Uuid::new_v4())?;
        let token = self.sign(&claims)?;
        let expires_on = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| AppError::internal(anyhow!("Token expiry out of range")))?;

        Ok(IssuedToken {
            token,
            claims,
            roles,
            expires_on,
        })
    }

    /// Assembles the payload for `subject` as of `now`, identified by `jti`.
    pub fn build_claims(
        &self,
        subject: TokenSubject<'_>,
        now: DateTime<Utc>,
        jti: Uuid,
    ) -> Result<TokenClaims, AppError> {
        let lifetime = TimeDelta::try_seconds(self.config.lifetime_seconds())
            .ok_or_else(|| AppError::internal(anyhow!("Token lifetime out of range")))?;
        let expires = now
            .checked_add_signed(lifetime)
            .ok_or_else(|| AppError::internal(anyhow!("Token expiry out of range")))?;

        let folded = fold_custom_claims(subject.custom_claims);
        let mut roles = folded.roles;
        roles.extend_from_slice(subject.roles);

        Ok(TokenClaims {
            sub: subject.username.to_string(),
            jti: jti.to_string(),
            email: subject.email.to_string(),
            uid: subject.user_id.to_string(),
            roles,
            custom: folded.members,
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        })
    }

    /// Signs `claims` with HS256 and serializes the token.
    pub fn sign(&self, claims: &TokenClaims) -> Result<String, AppError> {
        encode(&self.header, claims, &self.encoding_key)
            .map_err(|e| AppError::internal(anyhow!("Failed to create token: {}", e)))
    }

    /// Verifies signature, issuer, audience and expiry, returning the claims.
    ///
    /// # Errors
    ///
    /// Returns an unauthorized error for any invalid, foreign or expired token.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.issuer.as_str()]);
        validation.set_audience(&[self.config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::unauthorized(anyhow!("Invalid or expired token")))
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
