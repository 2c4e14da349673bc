//! Claim Scoring - API Server Binary
//!
//! This binary starts the HTTP API server for the claim scoring service.
//!
//! # Usage
//!
//! ```bash
//! # Run with config/settings.toml
//! cargo run --bin claim-scoring-api
//!
//! # Point at another settings file and override single keys
//! CONFIG_PATH=/etc/claims/settings.toml CLAIMS__API__PORT=9000 cargo run --bin claim-scoring-api
//! ```
//!
//! # Environment Variables
//!
//! * `CONFIG_PATH` - Settings file (default: config/settings.toml)
//! * `CLAIMS__<SECTION>__<KEY>` - Overrides one setting, e.g. `CLAIMS__LOGGER__LEVEL=debug`
//! * `RUST_LOG` - Log filter, takes precedence over `logger.level`

use anyhow::Context;
use interface_api::{config::Settings, create_router, telemetry::init_tracing, AppState};
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Main entry point for the API server.
///
/// Loads configuration, initializes logging, wires the service state and
/// starts the HTTP server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let settings = Settings::load().context("failed to load settings")?;

    // Held until exit so buffered file logs are flushed
    let _log_guard = init_tracing(&settings).context("failed to initialize logging")?;

    tracing::info!(
        host = %settings.api.host,
        port = %settings.api.port,
        root = %settings.paths.root.display(),
        steps = settings.pipeline.steps.len(),
        "Starting claim scoring API server"
    );

    let addr: SocketAddr = settings
        .server_addr()
        .parse()
        .with_context(|| format!("invalid server address {}", settings.server_addr()))?;

    let state = AppState::from_settings(settings).context("failed to open prediction log")?;
    let app = create_router(state);

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// This enables graceful shutdown of the server, allowing in-flight
/// requests to complete before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
