//! Imprint Server - REST API for the publisher directory

use anyhow::Result;
use imprint_server::{config::ServerConfig, routes, state};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imprint_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    let addr = config.addr;
    tracing::info!(data = %config.data_path.display(), "Opening data directory");

    // Create application state
    let state = state::AppState::new(config).await?;

    // Build router
    let app = routes::create_router(state);

    // Start server
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
