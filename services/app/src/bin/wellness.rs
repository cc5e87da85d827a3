//! services/app/src/bin/wellness.rs

use app_lib::{
    config::Config,
    error::AppError,
    web::{self, AppRuntime},
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Open Storage, Build Adapters & Start the Screen Loop ---
    let runtime = AppRuntime::from_config(config.clone()).await?;

    // --- 3. Create the Web Router ---
    let app = web::router(runtime.state.clone());

    // --- 4. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    let shutdown = runtime.shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => info!("Shutdown signal received."),
                _ = shutdown.cancelled() => {}
            }
        })
        .await?;

    runtime.shutdown().await?;
    info!("Server stopped.");
    Ok(())
}
