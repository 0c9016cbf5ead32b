use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use authforge_models::{AddRoleRequest, AuthResult, RegisterRequest, TokenRequest};

use crate::modules::auth::controller::{ErrorResponse, MessageResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register,
        crate::modules::auth::controller::get_token,
        crate::modules::auth::controller::add_role,
    ),
    components(
        schemas(
            RegisterRequest,
            TokenRequest,
            AddRoleRequest,
            AuthResult,
            MessageResponse,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration and token issuance"),
        (name = "Roles", description = "Role assignment")
    ),
    info(
        title = "Authforge API",
        version = "0.1.0",
        description = "Identity registration, login and role assignment issuing HS256 JWT bearer tokens.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

/// Documents the bearer scheme that issued tokens are meant for.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
