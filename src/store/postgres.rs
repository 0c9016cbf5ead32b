use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{instrument, warn};
use uuid::Uuid;

use authforge_core::{AppError, PasswordPolicy, hash_password, verify_password};
use authforge_models::{Identity, NewIdentity, UserClaim};

use super::{CreateOutcome, IdentityStore, RoleStore, reject_issuer_owned};

const IDENTITY_COLUMNS: &str = "id, username, email, first_name, last_name, password_hash";

/// Postgres-backed identity and role store.
///
/// Email and username lookups are case-insensitive, matching the
/// `LOWER(...)` unique indexes in the schema.
#[derive(Debug, Clone)]
pub struct PgStore {
    db: PgPool,
    policy: PasswordPolicy,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self::with_policy(db, PasswordPolicy::default())
    }

    pub fn with_policy(db: PgPool, policy: PasswordPolicy) -> Self {
        Self { db, policy }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}

/// Maps a unique violation on insert to the description reported to the caller.
fn describe_unique_violation(constraint: Option<&str>, identity: &NewIdentity) -> String {
    match constraint {
        Some("users_email_lower_key") => format!("Email '{}' is already taken.", identity.email),
        Some("users_username_lower_key") => {
            format!("Username '{}' is already taken.", identity.username)
        }
        _ => "Identity already exists.".to_string(),
    }
}

#[async_trait]
impl IdentityStore for PgStore {
    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AppError> {
        let identity = sqlx::query_as::<_, Identity>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(identity)
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, AppError> {
        let identity = sqlx::query_as::<_, Identity>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM users WHERE LOWER(username) = LOWER($1)"
        ))
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        Ok(identity)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>, AppError> {
        let identity = sqlx::query_as::<_, Identity>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(identity)
    }

    #[instrument(skip(self, identity, password), fields(username = %identity.username))]
    async fn create(
        &self,
        identity: NewIdentity,
        password: &str,
    ) -> Result<CreateOutcome, AppError> {
        let errors = self.policy.validate(password);
        if !errors.is_empty() {
            return Ok(CreateOutcome::Rejected(errors));
        }

        let password_hash = hash_password(password)?;

        let inserted = sqlx::query_as::<_, Identity>(&format!(
            "INSERT INTO users (id, username, email, first_name, last_name, password_hash)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {IDENTITY_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&identity.username)
        .bind(&identity.email)
        .bind(&identity.first_name)
        .bind(&identity.last_name)
        .bind(&password_hash)
        .fetch_one(&self.db)
        .await;

        match inserted {
            Ok(created) => Ok(CreateOutcome::Created(created)),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                warn!(constraint = ?db_err.constraint(), "Concurrent registration lost the race");
                Ok(CreateOutcome::Rejected(vec![describe_unique_violation(
                    db_err.constraint(),
                    &identity,
                )]))
            }
            Err(e) => Err(AppError::from(e)),
        }
    }

    async fn check_password(&self, identity: &Identity, password: &str) -> Result<bool, AppError> {
        verify_password(password, &identity.password_hash)
    }

    #[instrument(skip(self, identity), fields(user_id = %identity.id))]
    async fn get_roles(&self, identity: &Identity) -> Result<Vec<String>, AppError> {
        let roles = sqlx::query_scalar::<_, String>(
            "SELECT r.name FROM user_roles ur
             JOIN roles r ON r.id = ur.role_id
             WHERE ur.user_id = $1
             ORDER BY ur.assigned_at, r.name",
        )
        .bind(identity.id)
        .fetch_all(&self.db)
        .await?;

        Ok(roles)
    }

    #[instrument(skip(self, identity), fields(user_id = %identity.id))]
    async fn get_claims(&self, identity: &Identity) -> Result<Vec<UserClaim>, AppError> {
        let claims = sqlx::query_as::<_, UserClaim>(
            "SELECT claim_type, claim_value FROM user_claims WHERE user_id = $1 ORDER BY id",
        )
        .bind(identity.id)
        .fetch_all(&self.db)
        .await?;

        Ok(claims)
    }

    #[instrument(skip(self, identity), fields(user_id = %identity.id))]
    async fn add_claim(&self, identity: &Identity, claim: UserClaim) -> Result<(), AppError> {
        reject_issuer_owned(&claim)?;

        sqlx::query("INSERT INTO user_claims (user_id, claim_type, claim_value) VALUES ($1, $2, $3)")
            .bind(identity.id)
            .bind(&claim.claim_type)
            .bind(&claim.claim_value)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    #[instrument(skip(self, identity), fields(user_id = %identity.id))]
    async fn add_to_role(&self, identity: &Identity, role: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT INTO user_roles (user_id, role_id)
             SELECT $1, id FROM roles WHERE name = $2
             ON CONFLICT (user_id, role_id) DO NOTHING",
        )
        .bind(identity.id)
        .bind(role)
        .execute(&self.db)
        .await;

        match result {
            Ok(done) => Ok(done.rows_affected() == 1),
            // the identity vanished between lookup and insert
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => Ok(false),
            Err(e) => Err(AppError::from(e)),
        }
    }

    #[instrument(skip(self, identity), fields(user_id = %identity.id))]
    async fn is_in_role(&self, identity: &Identity, role: &str) -> Result<bool, AppError> {
        let member = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM user_roles ur
                JOIN roles r ON r.id = ur.role_id
                WHERE ur.user_id = $1 AND r.name = $2
            )",
        )
        .bind(identity.id)
        .bind(role)
        .fetch_one(&self.db)
        .await?;

        Ok(member)
    }
}

#[async_trait]
impl RoleStore for PgStore {
    #[instrument(skip(self))]
    async fn role_exists(&self, name: &str) -> Result<bool, AppError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM roles WHERE name = $1)")
                .bind(name)
                .fetch_one(&self.db)
                .await?;

        Ok(exists)
    }

    #[instrument(skip(self))]
    async fn create_role(&self, name: &str) -> Result<bool, AppError> {
        if name.trim().is_empty() {
            return Err(AppError::bad_request(anyhow!("Role name must not be empty")));
        }

        let result =
            sqlx::query("INSERT INTO roles (id, name) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING")
                .bind(Uuid::new_v4())
                .bind(name)
                .execute(&self.db)
                .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_identity() -> NewIdentity {
        NewIdentity {
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
        }
    }

    #[test]
    fn test_describe_unique_violation() {
        assert_eq!(
            describe_unique_violation(Some("users_email_lower_key"), &new_identity()),
            "Email 'a@x.com' is already taken."
        );
        assert_eq!(
            describe_unique_violation(Some("users_username_lower_key"), &new_identity()),
            "Username 'alice' is already taken."
        );
        assert_eq!(
            describe_unique_violation(None, &new_identity()),
            "Identity already exists."
        );
    }
}
