//! Identity and role storage.
//!
//! The authentication service only talks to storage through the
//! [`IdentityStore`] and [`RoleStore`] traits. Two adapters ship with the
//! crate:
//!
//! - [`postgres::PgStore`]: the production adapter, backed by sqlx. UNIQUE
//!   constraints on username and email close the window between the
//!   service's duplicate pre-check and the insert.
//! - `memory::MemoryStore`: an in-process adapter for tests, compiled with
//!   `cfg(test)` or the `test-utils` feature.
//!
//! Every method returns `Result<_, AppError>`; an `Err` always means an
//! infrastructure fault. Business outcomes (not found, rejected, already a
//! member) are carried in the `Ok` value.

use anyhow::anyhow;
use async_trait::async_trait;
use uuid::Uuid;

use authforge_auth::is_issuer_owned;
use authforge_core::AppError;
use authforge_models::{Identity, NewIdentity, UserClaim};

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

/// Result of asking the store to create an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(Identity),
    /// Validation errors in the order the store produced them.
    Rejected(Vec<String>),
}

#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>, AppError>;

    /// Validates `password` against the store's policy, hashes it and
    /// persists the identity. Nothing is persisted when the outcome is
    /// [`CreateOutcome::Rejected`].
    async fn create(&self, identity: NewIdentity, password: &str)
    -> Result<CreateOutcome, AppError>;

    async fn check_password(&self, identity: &Identity, password: &str) -> Result<bool, AppError>;

    /// Role names held by the identity, in store order.
    async fn get_roles(&self, identity: &Identity) -> Result<Vec<String>, AppError>;

    /// Custom claims stored against the identity, in insertion order.
    async fn get_claims(&self, identity: &Identity) -> Result<Vec<UserClaim>, AppError>;

    /// Stores a custom claim. Types the token issuer writes itself (other
    /// than `roles`) are refused with a bad request.
    async fn add_claim(&self, identity: &Identity, claim: UserClaim) -> Result<(), AppError>;

    /// Adds a membership. `Ok(false)` means the store refused the mutation.
    async fn add_to_role(&self, identity: &Identity, role: &str) -> Result<bool, AppError>;

    async fn is_in_role(&self, identity: &Identity, role: &str) -> Result<bool, AppError>;
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn role_exists(&self, name: &str) -> Result<bool, AppError>;

    /// Creates a role. `Ok(false)` when a role with that name already exists.
    async fn create_role(&self, name: &str) -> Result<bool, AppError>;
}

fn reject_issuer_owned(claim: &UserClaim) -> Result<(), AppError> {
    if is_issuer_owned(&claim.claim_type) {
        return Err(AppError::bad_request(anyhow!(
            "Claim type '{}' is reserved",
            claim.claim_type
        )));
    }
    Ok(())
}

/// Both halves of the storage contract behind one object.
pub trait AuthStore: IdentityStore + RoleStore {}

impl<T: IdentityStore + RoleStore + ?Sized> AuthStore for T {}
