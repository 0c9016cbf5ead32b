//! In-process store for tests.
//!
//! Mirrors the Postgres adapter's observable behavior: Unicode
//! case-insensitive email/username lookups, password policy on create, roles reported in
//! assignment order. Passwords are hashed at the lowest bcrypt cost.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::anyhow;
use async_trait::async_trait;
use uuid::Uuid;

use authforge_core::{AppError, PasswordPolicy, hash_password_with_cost, verify_password};
use authforge_models::{Identity, NewIdentity, UserClaim};

use super::{CreateOutcome, IdentityStore, RoleStore, reject_issuer_owned};

const TEST_BCRYPT_COST: u32 = 4;

/// Unicode case folding, as `LOWER()` does for the Postgres unique indexes.
fn same_folded(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[derive(Debug, Default)]
struct Inner {
    users: Vec<Identity>,
    roles: Vec<String>,
    memberships: Vec<(Uuid, String)>,
    claims: Vec<(Uuid, UserClaim)>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    policy: PasswordPolicy,
    reject_role_mutations: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with the given roles already created.
    pub fn with_roles(roles: &[&str]) -> Self {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.write() {
            inner.roles = roles.iter().map(|r| r.to_string()).collect();
        }
        store
    }

    pub fn with_policy(mut self, policy: PasswordPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Makes every subsequent `add_to_role` report a refused mutation.
    pub fn reject_role_mutations(&self, reject: bool) {
        self.reject_role_mutations.store(reject, Ordering::SeqCst);
    }

    pub fn user_count(&self) -> usize {
        self.read().map(|inner| inner.users.len()).unwrap_or(0)
    }

    pub fn membership_count(&self, user_id: Uuid, role: &str) -> usize {
        self.read()
            .map(|inner| {
                inner
                    .memberships
                    .iter()
                    .filter(|(id, name)| *id == user_id && name == role)
                    .count()
            })
            .unwrap_or(0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, AppError> {
        self.inner
            .read()
            .map_err(|_| AppError::internal(anyhow!("Memory store lock poisoned")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, AppError> {
        self.inner
            .write()
            .map_err(|_| AppError::internal(anyhow!("Memory store lock poisoned")))
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AppError> {
        Ok(self
            .read()?
            .users
            .iter()
            .find(|u| same_folded(&u.email, email))
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, AppError> {
        Ok(self
            .read()?
            .users
            .iter()
            .find(|u| same_folded(&u.username, username))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>, AppError> {
        Ok(self.read()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(
        &self,
        identity: NewIdentity,
        password: &str,
    ) -> Result<CreateOutcome, AppError> {
        let errors = self.policy.validate(password);
        if !errors.is_empty() {
            return Ok(CreateOutcome::Rejected(errors));
        }

        let password_hash = hash_password_with_cost(password, TEST_BCRYPT_COST)?;
        let mut inner = self.write()?;

        // same guarantee the unique indexes give the Postgres adapter
        if inner
            .users
            .iter()
            .any(|u| same_folded(&u.email, &identity.email))
        {
            return Ok(CreateOutcome::Rejected(vec![format!(
                "Email '{}' is already taken.",
                identity.email
            )]));
        }
        if inner
            .users
            .iter()
            .any(|u| same_folded(&u.username, &identity.username))
        {
            return Ok(CreateOutcome::Rejected(vec![format!(
                "Username '{}' is already taken.",
                identity.username
            )]));
        }

        let created = Identity {
            id: Uuid::new_v4(),
            username: identity.username,
            email: identity.email,
            first_name: identity.first_name,
            last_name: identity.last_name,
            password_hash,
        };
        inner.users.push(created.clone());

        Ok(CreateOutcome::Created(created))
    }

    async fn check_password(&self, identity: &Identity, password: &str) -> Result<bool, AppError> {
        verify_password(password, &identity.password_hash)
    }

    async fn get_roles(&self, identity: &Identity) -> Result<Vec<String>, AppError> {
        Ok(self
            .read()?
            .memberships
            .iter()
            .filter(|(id, _)| *id == identity.id)
            .map(|(_, role)| role.clone())
            .collect())
    }

    async fn get_claims(&self, identity: &Identity) -> Result<Vec<UserClaim>, AppError> {
        Ok(self
            .read()?
            .claims
            .iter()
            .filter(|(id, _)| *id == identity.id)
            .map(|(_, claim)| claim.clone())
            .collect())
    }

    async fn add_claim(&self, identity: &Identity, claim: UserClaim) -> Result<(), AppError> {
        reject_issuer_owned(&claim)?;
        self.write()?.claims.push((identity.id, claim));
        Ok(())
    }

    async fn add_to_role(&self, identity: &Identity, role: &str) -> Result<bool, AppError> {
        if self.reject_role_mutations.load(Ordering::SeqCst) {
            return Ok(false);
        }

        let mut inner = self.write()?;
        let known_user = inner.users.iter().any(|u| u.id == identity.id);
        let known_role = inner.roles.iter().any(|r| r == role);
        let already = inner
            .memberships
            .iter()
            .any(|(id, name)| *id == identity.id && name == role);

        if !known_user || !known_role || already {
            return Ok(false);
        }

        inner.memberships.push((identity.id, role.to_string()));
        Ok(true)
    }

    async fn is_in_role(&self, identity: &Identity, role: &str) -> Result<bool, AppError> {
        Ok(self
            .read()?
            .memberships
            .iter()
            .any(|(id, name)| *id == identity.id && name == role))
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn role_exists(&self, name: &str) -> Result<bool, AppError> {
        Ok(self.read()?.roles.iter().any(|r| r == name))
    }

    async fn create_role(&self, name: &str) -> Result<bool, AppError> {
        if name.trim().is_empty() {
            return Err(AppError::bad_request(anyhow!("Role name must not be empty")));
        }

        let mut inner = self.write()?;
        if inner.roles.iter().any(|r| r == name) {
            return Ok(false);
        }
        inner.roles.push(name.to_string());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_identity(username: &str, email: &str) -> NewIdentity {
        NewIdentity {
            username: username.to_string(),
            email: email.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
        }
    }

    async fn created(store: &MemoryStore, username: &str, email: &str) -> Identity {
        match store
            .create(new_identity(username, email), "Pw1!")
            .await
            .unwrap()
        {
            CreateOutcome::Created(identity) => identity,
            CreateOutcome::Rejected(errors) => panic!("unexpected rejection: {:?}", errors),
        }
    }

    #[tokio::test]
    async fn test_create_applies_policy() {
        let store = MemoryStore::new();
        let outcome = store
            .create(new_identity("bob", "b@x.com"), "weak")
            .await
            .unwrap();

        assert!(matches!(outcome, CreateOutcome::Rejected(ref e) if e.len() == 3));
        assert_eq!(store.user_count(), 0);
    }

    #[tokio::test]
    async fn test_lookups_ignore_case() {
        let store = MemoryStore::new();
        let alice = created(&store, "alice", "a@x.com").await;

        assert_eq!(store.find_by_email("A@X.COM").await.unwrap(), Some(alice.clone()));
        assert_eq!(store.find_by_username("Alice").await.unwrap(), Some(alice));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let store = MemoryStore::new();
        created(&store, "alice", "a@x.com").await;

        let outcome = store
            .create(new_identity("alice2", "a@x.com"), "Pw1!")
            .await
            .unwrap();
        assert_eq!(
            outcome,
            CreateOutcome::Rejected(vec!["Email 'a@x.com' is already taken.".to_string()])
        );
    }

    #[tokio::test]
    async fn test_roles_in_assignment_order() {
        let store = MemoryStore::with_roles(&["User", "Admin", "Auditor"]);
        let alice = created(&store, "alice", "a@x.com").await;

        assert!(store.add_to_role(&alice, "Auditor").await.unwrap());
        assert!(store.add_to_role(&alice, "User").await.unwrap());
        assert!(!store.add_to_role(&alice, "User").await.unwrap());
        assert!(!store.add_to_role(&alice, "Ghost").await.unwrap());

        assert_eq!(store.get_roles(&alice).await.unwrap(), vec!["Auditor", "User"]);
        assert_eq!(store.membership_count(alice.id, "User"), 1);
    }

    #[tokio::test]
    async fn test_create_role_is_idempotent() {
        let store = MemoryStore::new();
        assert!(store.create_role("Admin").await.unwrap());
        assert!(!store.create_role("Admin").await.unwrap());
        assert!(store.role_exists("Admin").await.unwrap());
        assert!(!store.role_exists("admin").await.unwrap());
        assert!(store.create_role("  ").await.is_err());
    }

    #[tokio::test]
    async fn test_lookups_fold_non_ascii_case() {
        let store = MemoryStore::new();
        let jorg = created(&store, "jörg", "jörg@x.com").await;

        assert_eq!(store.find_by_email("JÖRG@X.COM").await.unwrap(), Some(jorg.clone()));
        assert_eq!(store.find_by_username("JÖRG").await.unwrap(), Some(jorg));

        let outcome = store
            .create(new_identity("Jörg", "other@x.com"), "Pw1!")
            .await
            .unwrap();
        assert_eq!(
            outcome,
            CreateOutcome::Rejected(vec!["Username 'Jörg' is already taken.".to_string()])
        );
    }

    #[tokio::test]
    async fn test_add_claim_refuses_issuer_owned_types() {
        let store = MemoryStore::new();
        let alice = created(&store, "alice", "a@x.com").await;

        let err = store
            .add_claim(&alice, UserClaim::new("sub", "mallory"))
            .await
            .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);

        store
            .add_claim(&alice, UserClaim::new("roles", "Auditor"))
            .await
            .unwrap();
        assert_eq!(
            store.get_claims(&alice).await.unwrap(),
            vec![UserClaim::new("roles", "Auditor")]
        );
    }

    #[tokio::test]
    async fn test_with_policy_replaces_default_rules() {
        let store = MemoryStore::new().with_policy(PasswordPolicy {
            required_length: 1,
            require_non_alphanumeric: false,
            require_digit: false,
            require_lowercase: false,
            require_uppercase: false,
        });

        let outcome = store
            .create(new_identity("bob", "b@x.com"), "plain")
            .await
            .unwrap();
        assert!(matches!(outcome, CreateOutcome::Created(_)));
    }
}
