use std::sync::Arc;

use authforge_auth::TokenIssuer;
use authforge_config::{CorsConfig, JwtConfig};

use crate::store::AuthStore;

/// Shared application state.
///
/// The store sits behind a trait object so the same router serves the
/// Postgres adapter in production and the in-memory adapter in tests.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AuthStore>,
    pub issuer: Arc<TokenIssuer>,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn AuthStore>, jwt_config: JwtConfig, cors_config: CorsConfig) -> Self {
        Self {
            store,
            issuer: Arc::new(TokenIssuer::new(jwt_config)),
            cors_config,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("issuer", &self.issuer)
            .field("cors_config", &self.cors_config)
            .finish_non_exhaustive()
    }
}
