use tracing::{info, instrument, warn};
use uuid::Uuid;

use authforge_auth::{IssuedToken, TokenIssuer, TokenSubject};
use authforge_core::AppError;
use authforge_models::{
    AddRoleRequest, AuthFailure, AuthResult, DEFAULT_ROLE, Identity, NewIdentity,
    RegisterRequest, TokenRequest, UserClaim,
};

use crate::metrics::{track_auth_failure, track_role_assigned, track_token_issued};
use crate::store::{AuthStore, CreateOutcome};

pub struct AuthService;

impl AuthService {
    /// Registers a new identity, grants it [`DEFAULT_ROLE`] and issues a token.
    ///
    /// Duplicate email is checked before duplicate username. The checks are
    /// optimistic; the store's own uniqueness guarantee decides races, and a
    /// lost race comes back as a creation rejection.
    #[instrument(skip(store, issuer, dto), fields(email = %dto.email, username = %dto.username))]
    pub async fn register<S>(
        store: &S,
        issuer: &TokenIssuer,
        dto: RegisterRequest,
    ) -> Result<AuthResult, AppError>
    where
        S: AuthStore + ?Sized,
    {
        if store.find_by_email(&dto.email).await?.is_some() {
            return Ok(Self::refuse("register", AuthFailure::DuplicateEmail));
        }
        if store.find_by_username(&dto.username).await?.is_some() {
            return Ok(Self::refuse("register", AuthFailure::DuplicateUsername));
        }

        let new_identity = NewIdentity {
            username: dto.username,
            email: dto.email,
            first_name: dto.first_name,
            last_name: dto.last_name,
        };

        let identity = match store.create(new_identity, &dto.password).await? {
            CreateOutcome::Created(identity) => identity,
            CreateOutcome::Rejected(errors) => {
                return Ok(Self::refuse(
                    "register",
                    AuthFailure::IdentityCreationRejected(errors),
                ));
            }
        };

        if !store.add_to_role(&identity, DEFAULT_ROLE).await? {
            warn!(user_id = %identity.id, role = DEFAULT_ROLE, "Default role was not assigned");
        }

        let issued = Self::create_token(store, issuer, &identity).await?;
        track_token_issued("register");
        info!(user_id = %identity.id, "Identity registered");

        Ok(AuthResult::success(
            identity.username,
            identity.email,
            vec![DEFAULT_ROLE.to_string()],
            issued.token,
            issued.expires_on,
        ))
    }

    /// Verifies credentials and issues a token carrying the current roles.
    ///
    /// An unknown email and a wrong password produce the same failure.
    #[instrument(skip(store, issuer, dto), fields(email = %dto.email))]
    pub async fn login<S>(
        store: &S,
        issuer: &TokenIssuer,
        dto: TokenRequest,
    ) -> Result<AuthResult, AppError>
    where
        S: AuthStore + ?Sized,
    {
        let Some(identity) = store.find_by_email(&dto.email).await? else {
            return Ok(Self::refuse("login", AuthFailure::InvalidCredentials));
        };
        if !store.check_password(&identity, &dto.password).await? {
            return Ok(Self::refuse("login", AuthFailure::InvalidCredentials));
        }

        let issued = Self::create_token(store, issuer, &identity).await?;
        track_token_issued("login");

        Ok(AuthResult::success(
            identity.username,
            identity.email,
            issued.roles,
            issued.token,
            issued.expires_on,
        ))
    }

    /// Grants `dto.role` to the identity `dto.user_id`.
    ///
    /// Returns an empty string on success, otherwise the failure message.
    #[instrument(skip(store))]
    pub async fn add_role<S>(store: &S, dto: AddRoleRequest) -> Result<String, AppError>
    where
        S: AuthStore + ?Sized,
    {
        match Self::try_add_role(store, &dto).await? {
            Ok(()) => {
                track_role_assigned(&dto.role);
                info!(user_id = %dto.user_id, role = %dto.role, "Role assigned");
                Ok(String::new())
            }
            Err(failure) => {
                track_auth_failure("add_role", failure.kind());
                Ok(failure.to_string())
            }
        }
    }

    async fn try_add_role<S>(
        store: &S,
        dto: &AddRoleRequest,
    ) -> Result<Result<(), AuthFailure>, AppError>
    where
        S: AuthStore + ?Sized,
    {
        let identity = match Uuid::parse_str(&dto.user_id) {
            Ok(id) => store.find_by_id(id).await?,
            Err(_) => None,
        };

        let Some(identity) = identity else {
            return Ok(Err(AuthFailure::InvalidRoleTarget));
        };
        if !store.role_exists(&dto.role).await? {
            return Ok(Err(AuthFailure::InvalidRoleTarget));
        }

        if store.is_in_role(&identity, &dto.role).await? {
            return Ok(Err(AuthFailure::AlreadyInRole));
        }

        if store.add_to_role(&identity, &dto.role).await? {
            Ok(Ok(()))
        } else {
            Ok(Err(AuthFailure::RoleAssignmentFailed))
        }
    }

    /// Issues a token for an already verified identity.
    ///
    /// Reads the identity's roles and custom claims from the store on every
    /// call; nothing is cached between issuances.
    #[instrument(skip(store, issuer, identity), fields(user_id = %identity.id))]
    pub async fn create_token<S>(
        store: &S,
        issuer: &TokenIssuer,
        identity: &Identity,
    ) -> Result<IssuedToken, AppError>
    where
        S: AuthStore + ?Sized,
    {
        let custom_claims: Vec<(String, String)> = store
            .get_claims(identity)
            .await?
            .into_iter()
            .map(UserClaim::into_pair)
            .collect();
        let roles = store.get_roles(identity).await?;

        issuer.issue(TokenSubject {
            user_id: identity.id,
            username: &identity.username,
            email: &identity.email,
            roles: &roles,
            custom_claims: &custom_claims,
        })
    }

    fn refuse(operation: &'static str, failure: AuthFailure) -> AuthResult {
        warn!(operation, reason = failure.kind(), "Authentication refused");
        track_auth_failure(operation, failure.kind());
        AuthResult::from(failure)
    }
}
