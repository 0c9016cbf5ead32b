pub mod auth;

pub use self::auth::service::AuthService;
