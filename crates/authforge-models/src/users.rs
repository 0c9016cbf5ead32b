//! Identity records.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One account as held by the identity store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Opaque credential owned by the store; never serialized.
    #[serde(skip)]
    pub password_hash: String,
}

/// Profile submitted to the store when creating an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIdentity {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// A custom claim stored against an identity and copied into its tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserClaim {
    pub claim_type: String,
    pub claim_value: String,
}

impl UserClaim {
    pub fn new(claim_type: impl Into<String>, claim_value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            claim_value: claim_value.into(),
        }
    }

    pub fn into_pair(self) -> (String, String) {
        (self.claim_type, self.claim_value)
    }
}
