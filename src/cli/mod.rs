//! Administrative operations behind `authforge-cli`.
//!
//! Each function takes the store as a trait object so the same code runs
//! against Postgres from the binary and against the in-memory store in tests.

use anyhow::{Result, anyhow, bail};
use tracing::info;
use uuid::Uuid;

use authforge_models::{AddRoleRequest, DEFAULT_ROLE, UserClaim};

use crate::modules::AuthService;
use crate::store::{AuthStore, IdentityStore, RoleStore};

/// Roles every deployment starts with.
pub const SEED_ROLES: [&str; 2] = [DEFAULT_ROLE, "Admin"];

/// Creates `name`. Returns `false` when the role already existed.
pub async fn create_role(store: &dyn AuthStore, name: &str) -> Result<bool> {
    let created = store.create_role(name.trim()).await.map_err(|e| e.error)?;
    if created {
        info!(role = name, "Role created");
    }
    Ok(created)
}

/// Ensures the seed roles exist, returning the ones that had to be created.
pub async fn seed_roles(store: &dyn AuthStore) -> Result<Vec<&'static str>> {
    let mut created = Vec::new();
    for role in SEED_ROLES {
        if create_role(store, role).await? {
            created.push(role);
        }
    }
    Ok(created)
}

/// Grants `role` to the user with id `user_id`, failing with the same message
/// the HTTP endpoint reports.
pub async fn assign_role(store: &dyn AuthStore, user_id: &str, role: &str) -> Result<()> {
    let request = AddRoleRequest {
        user_id: user_id.to_string(),
        role: role.to_string(),
    };

    let message = AuthService::add_role(store, request)
        .await
        .map_err(|e| e.error)?;
    if !message.is_empty() {
        bail!(message);
    }
    Ok(())
}

/// Attaches a custom claim that will be carried by every token issued to the user.
pub async fn add_claim(
    store: &dyn AuthStore,
    user_id: &str,
    claim_type: &str,
    claim_value: &str,
) -> Result<()> {
    let id = Uuid::parse_str(user_id).map_err(|_| anyhow!("Invalid user id: {user_id}"))?;
    let identity = store
        .find_by_id(id)
        .await
        .map_err(|e| e.error)?
        .ok_or_else(|| anyhow!("User {user_id} not found"))?;

    store
        .add_claim(&identity, UserClaim::new(claim_type, claim_value))
        .await
        .map_err(|e| e.error)?;

    info!(user_id, claim_type, "Claim added");
    Ok(())
}
