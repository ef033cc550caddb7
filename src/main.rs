use std::sync::Arc;

use nutrical_api::auth::{JwtSessionValidator, PgUserDirectory};
use nutrical_api::config::AppConfig;
use nutrical_api::database::{DatabaseManager, PgDietarySettingsStore};
use nutrical_api::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECURITY_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();
    tracing::info!("Starting Nutrical API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("SECURITY_JWT_SECRET must be set outside development");
    }

    let pool = DatabaseManager::connect(&config.database).await?;
    if config.database.run_migrations {
        DatabaseManager::migrate(&pool).await?;
    }

    let state = AppState::new(
        Arc::new(PgDietarySettingsStore::new(pool.clone())),
        Arc::new(JwtSessionValidator::new(
            PgUserDirectory::new(pool.clone()),
            config.security.jwt_secret.clone(),
        )),
    );
    let app = nutrical_api::app::app(state, &config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Nutrical API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    DatabaseManager::close(pool).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
