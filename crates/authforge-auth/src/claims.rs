//! JWT payload for issued tokens.
//!
//! Role claims are written under [`ROLE_CLAIM`] as one array entry per
//! role. Custom claims stored against an identity are folded into top-level
//! members of the payload by [`fold_custom_claims`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use authforge_core::serde::deserialize_one_or_many;

/// Claim key under which every assigned role is written.
pub const ROLE_CLAIM: &str = "roles";

/// Claim names written by the issuer.
pub const REGISTERED_CLAIMS: &[&str] = &[
    "sub", "jti", "email", "uid", ROLE_CLAIM, "iss", "aud", "iat", "exp", "nbf",
];

/// Whether a stored custom claim of this type would overwrite a value the
/// issuer writes itself. [`ROLE_CLAIM`] is not issuer-owned: stored role
/// claims join the role list.
pub fn is_issuer_owned(claim_type: &str) -> bool {
    claim_type != ROLE_CLAIM && REGISTERED_CLAIMS.contains(&claim_type)
}

/// Claims carried by an issued token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Username of the identity (subject claim)
    pub sub: String,
    /// Unique token identifier, fresh for every issuance
    pub jti: String,
    /// Email address of the identity
    pub email: String,
    /// Internal identifier of the identity
    pub uid: String,
    /// Stored role claims followed by the roles held at issuance time
    #[serde(
        default,
        deserialize_with = "deserialize_one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub roles: Vec<String>,
    /// Custom claims stored against the identity
    #[serde(flatten)]
    pub custom: BTreeMap<String, Value>,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Issued-at timestamp (Unix seconds)
    pub iat: i64,
    /// Expiration timestamp (Unix seconds)
    pub exp: i64,
}

/// Stored custom claims split into role entries and other payload members.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FoldedClaims {
    /// Values of stored [`ROLE_CLAIM`] pairs, in stored order
    pub roles: Vec<String>,
    pub members: BTreeMap<String, Value>,
}

/// Folds stored `(type, value)` claim pairs into payload members.
///
/// Every pair is kept in stored order. A type seen once becomes a string
/// member; a type seen several times becomes an array holding every value,
/// repeats included. [`ROLE_CLAIM`] pairs go to [`FoldedClaims::roles`].
/// Issuer-owned types are refused when stored, so a pair of that kind can
/// only come from data written around the store; it is skipped and logged.
pub fn fold_custom_claims(pairs: &[(String, String)]) -> FoldedClaims {
    let mut roles = Vec::new();
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (claim_type, claim_value) in pairs {
        if claim_type == ROLE_CLAIM {
            roles.push(claim_value.clone());
        } else if is_issuer_owned(claim_type) {
            warn!(claim_type = %claim_type, "Skipping stored claim that shadows an issuer claim");
        } else {
            grouped
                .entry(claim_type.clone())
                .or_default()
                .push(claim_value.clone());
        }
    }

    let members = grouped
        .into_iter()
        .map(|(claim_type, mut values)| {
            let value = if values.len() == 1 {
                Value::String(values.remove(0))
            } else {
                Value::Array(values.into_iter().map(Value::String).collect())
            };
            (claim_type, value)
        })
        .collect();

    FoldedClaims { roles, members }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    fn sample_claims() -> TokenClaims {
        TokenClaims {
            sub: "alice".to_string(),
            jti: "3f1c0c9e-8d0a-4b8e-9a57-1f1f0e2b7c11".to_string(),
            email: "a@x.com".to_string(),
            uid: "6b1d2a58-8a57-4cc0-9b33-6d3c1f63a0f1".to_string(),
            roles: vec!["User".to_string(), "Admin".to_string()],
            custom: fold_custom_claims(&[pair("department", "ops")]).members,
            iss: "issuer".to_string(),
            aud: "audience".to_string(),
            iat: 1_700_000_000,
            exp: 1_702_592_000,
        }
    }

    #[test]
    fn test_roles_serialize_as_repeated_entries() {
        let serialized = serde_json::to_string(&sample_claims()).unwrap();
        assert!(serialized.contains(r#""roles":["User","Admin"]"#));
        assert!(serialized.contains(r#""department":"ops""#));
    }

    #[test]
    fn test_claims_round_trip_preserves_custom_members() {
        let claims = sample_claims();
        let json = serde_json::to_string(&claims).unwrap();
        let decoded: TokenClaims = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_empty_roles_are_omitted() {
        let mut claims = sample_claims();
        claims.roles.clear();
        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(!serialized.contains("roles"));
    }

    #[test]
    fn test_single_role_string_is_accepted() {
        let json = r#"{"sub":"bob","jti":"j","email":"b@x.com","uid":"u","roles":"User","iss":"i","aud":"a","iat":1,"exp":2}"#;
        let claims: TokenClaims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.roles, vec!["User"]);
        assert!(claims.custom.is_empty());
    }

    #[test]
    fn test_fold_groups_repeated_types() {
        let folded = fold_custom_claims(&[
            pair("scope", "read"),
            pair("scope", "write"),
            pair("tenant", "acme"),
        ]);
        assert_eq!(folded.members["scope"], serde_json::json!(["read", "write"]));
        assert_eq!(folded.members["tenant"], serde_json::json!("acme"));
        assert!(folded.roles.is_empty());
    }

    #[test]
    fn test_fold_keeps_repeated_pairs() {
        let folded = fold_custom_claims(&[
            pair("tenant", "acme"),
            pair("tenant", "acme"),
            pair("roles", "Auditor"),
        ]);
        assert_eq!(folded.members["tenant"], serde_json::json!(["acme", "acme"]));
        assert_eq!(folded.roles, vec!["Auditor"]);
    }

    #[test]
    fn test_fold_routes_role_claims_and_skips_issuer_owned() {
        let folded = fold_custom_claims(&[
            pair("sub", "mallory"),
            pair("roles", "Auditor"),
            pair("exp", "0"),
            pair("roles", "Auditor"),
            pair("nickname", "al"),
        ]);
        assert_eq!(folded.roles, vec!["Auditor", "Auditor"]);
        assert_eq!(folded.members.len(), 1);
        assert!(folded.members.contains_key("nickname"));
    }

    #[test]
    fn test_issuer_owned_names() {
        assert!(is_issuer_owned("sub"));
        assert!(is_issuer_owned("exp"));
        assert!(!is_issuer_owned("roles"));
        assert!(!is_issuer_owned("department"));
    }
}
