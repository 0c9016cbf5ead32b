use std::sync::Arc;

use authforge::router::init_router;
use authforge::state::AppState;
use authforge::store::memory::MemoryStore;
use authforge_auth::TokenIssuer;
use authforge_config::{CorsConfig, JwtConfig};
use authforge_models::RegisterRequest;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "Pw1!";

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        key: "test-signing-key-with-enough-length".to_string(),
        issuer: "AuthforgeTest".to_string(),
        audience: "AuthforgeTestUsers".to_string(),
        duration_in_days: 30,
    }
}

#[allow(dead_code)]
pub fn test_issuer() -> TokenIssuer {
    TokenIssuer::new(test_jwt_config())
}

/// A store holding the roles the initial migration seeds.
#[allow(dead_code)]
pub fn seeded_store() -> MemoryStore {
    MemoryStore::with_roles(&["User", "Admin"])
}

#[allow(dead_code)]
pub fn register_request(username: &str, email: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[allow(dead_code)]
pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

#[allow(dead_code)]
pub fn setup_test_app(store: Arc<MemoryStore>) -> axum::Router {
    let state = AppState::new(
        store,
        test_jwt_config(),
        CorsConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
    );
    init_router(state)
}
