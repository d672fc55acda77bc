//! Iris Server - REST API for image palette extraction
//!
//! Exposes iris-core functionality via HTTP endpoints:
//! - POST /api/extract - Extract and store a palette from an uploaded image
//! - GET  /api/history - Recent results
//! - GET  /api/result/{id} - One result
//! - POST /api/history/clear - Delete all results and their images

use std::net::SocketAddr;

use iris_server::{create_router_with_config, AppState, Config, StartupError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Config::from_env();
    let state = AppState::from_config(&config).await?;
    tracing::info!(
        data_dir = %config.data_dir.display(),
        max_upload_bytes = config.max_upload_bytes,
        collision_policy = ?config.collision_policy,
        "Iris server starting"
    );

    let app = create_router_with_config(state, &config);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
