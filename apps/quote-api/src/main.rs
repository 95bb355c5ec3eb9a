//! # PrintWise Quote API
//!
//! HTTP server for staff quote management and client approval links.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Quote API Server                                 │
//! │                                                                         │
//! │  Staff UI ──┐                                                           │
//! │             ├──► HTTP (8080) ───► QuoteService ───► SQLite (WAL)        │
//! │  Client ────┘                          │                                │
//! │  (share link)                          ▼                                │
//! │                                  printwise-core                         │
//! │                               (pricing, lifecycle)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::Context;
use tracing::{info, warn};

use printwise_api::{build_app, telemetry, ApiConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ApiConfig::load().context("loading configuration")?;

    // Initialize tracing
    telemetry::init(config.log_format);
    info!("Starting PrintWise Quote API...");
    info!(
        port = config.http_port,
        database = %config.database_path.display(),
        waste_threshold = %config.waste_threshold,
        token_ttl_days = ?config.token_ttl_days,
        "Configuration loaded"
    );

    let addr = config.socket_addr()?;

    // Connect to database (runs migrations)
    let state = AppState::connect(config)
        .await
        .context("opening database")?;
    info!("Database ready");

    let db = state.service.database().clone();
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "Starting HTTP server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
