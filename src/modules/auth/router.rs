use axum::{Router, routing::post};

use super::controller::{add_role, get_token, register};
use crate::state::AppState;

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/token", post(get_token))
        .route("/addrole", post(add_role))
}
