//! # Authforge Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: Token signing secret, issuer, audience and lifetime
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`server`]: Listen address for the HTTP service
//!
//! Values are read once at startup and handed around as immutable values;
//! nothing in the request path consults the environment.
//!
//! # Example
//!
//! ```ignore
//! use authforge_config::{CorsConfig, JwtConfig, ServerConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let cors_config = CorsConfig::from_env();
//! let server_config = ServerConfig::from_env();
//! ```

pub mod cors;
pub mod jwt;
pub mod server;

// Re-export commonly used types at crate root
pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use server::ServerConfig;
