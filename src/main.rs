use std::sync::Arc;

use anyhow::Context;
use authforge::logging::{init_tracing, shutdown_tracer};
use authforge::metrics::{init_metrics, metrics_app};
use authforge::router::init_router;
use authforge::state::AppState;
use authforge::store::PgStore;
use authforge_config::{CorsConfig, JwtConfig, ServerConfig};
use authforge_db::{init_db_pool, run_migrations};
use dotenvy::dotenv;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    init_tracing();
    let metrics_handle = init_metrics();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = init_db_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let state = AppState::new(
        Arc::new(PgStore::new(pool)),
        JwtConfig::from_env(),
        CorsConfig::from_env(),
    );

    let mut app = init_router(state);
    if let Some(handle) = metrics_handle {
        app = app.merge(metrics_app(handle));
    }

    let server_config = ServerConfig::from_env();
    let address = server_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    info!("🚀 Server running on http://{}", address);
    info!("📚 Swagger UI available at http://{}/swagger-ui", address);
    info!("📖 Scalar UI available at http://{}/scalar", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    shutdown_tracer().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
