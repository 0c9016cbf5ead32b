//! # Authforge DB
//!
//! Database pool and schema migrations for Authforge.
//!
//! The schema lives in this crate's `migrations/` directory and is embedded
//! at compile time through [`sqlx::migrate!`]. It creates the identity,
//! role, membership and claim tables. Username and email carry
//! case-insensitive UNIQUE indexes; role names and `(user_id, role_id)`
//! are unique too. The `User` and `Admin` roles are seeded.
//!
//! # Example
//!
//! ```ignore
//! use authforge_db::{init_db_pool, run_migrations};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sqlx::Error> {
//!     let pool = init_db_pool(&std::env::var("DATABASE_URL").unwrap()).await?;
//!     run_migrations(&pool).await?;
//!     Ok(())
//! }
//! ```

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Opens a PostgreSQL connection pool for `database_url`.
///
/// The returned pool is cheaply cloneable and should be created once at
/// startup and shared through the application state.
pub async fn init_db_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("Database connection pool established");
    Ok(pool)
}

/// Applies any pending migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

// Re-export PgPool for convenience
pub use sqlx::PgPool;
