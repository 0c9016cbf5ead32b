use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use authforge_core::AppError;
use authforge_models::{AddRoleRequest, AuthResult, RegisterRequest, TokenRequest};

use super::service::AuthService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

fn auth_response(result: AuthResult) -> (StatusCode, Json<AuthResult>) {
    let status = if result.is_authenticated {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(result))
}

/// Register a new account and receive a token
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account registered, token issued", body = AuthResult),
        (status = 400, description = "Duplicate email/username or password rejected", body = AuthResult),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResult>), AppError> {
    let result = AuthService::register(state.store.as_ref(), &state.issuer, dto).await?;
    Ok(auth_response(result))
}

/// Exchange email and password for a token
#[utoipa::path(
    post,
    path = "/api/auth/token",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Credentials accepted, token issued", body = AuthResult),
        (status = 400, description = "Email or password is incorrect", body = AuthResult),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn get_token(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<TokenRequest>,
) -> Result<(StatusCode, Json<AuthResult>), AppError> {
    let result = AuthService::login(state.store.as_ref(), &state.issuer, dto).await?;
    Ok(auth_response(result))
}

/// Grant an existing role to an account
#[utoipa::path(
    post,
    path = "/api/auth/addrole",
    request_body = AddRoleRequest,
    responses(
        (status = 200, description = "Role assigned", body = AddRoleRequest),
        (status = 400, description = "Unknown user or role, or role already held", body = MessageResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Roles"
)]
#[instrument(skip(state))]
pub async fn add_role(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<AddRoleRequest>,
) -> Result<Response, AppError> {
    let message = AuthService::add_role(state.store.as_ref(), dto.clone()).await?;
    if message.is_empty() {
        Ok(Json(dto).into_response())
    } else {
        Ok((StatusCode::BAD_REQUEST, Json(MessageResponse { message })).into_response())
    }
}
