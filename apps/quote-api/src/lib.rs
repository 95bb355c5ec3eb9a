//! # PrintWise Quote API
//!
//! JSON/HTTP server for the quoting workflow.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Quote API Routes                               │
//! │                                                                         │
//! │  ┌────────────────────────┐  ┌──────────────────────────────────────┐  │
//! │  │  Public (token holder) │  │  Staff (x-staff-id)                  │  │
//! │  │                        │  │                                      │  │
//! │  │ • GET  /quotes/view/…  │  │ • POST /admin/quotes/calculate       │  │
//! │  │ • POST /quotes/approve │  │ • CRUD /admin/quotes[/{id}]          │  │
//! │  │ • POST /quotes/reject  │  │ • GET  /admin/finishings?format=     │  │
//! │  └────────────────────────┘  │ • POST/GET /admin/waste              │  │
//! │                              └──────────────────────────────────────┘  │
//! │                                                                         │
//! │  GET /health                                                            │
//! │                                                                         │
//! │  Every handler builds a RequestContext and calls one QuoteService       │
//! │  operation; errors map to {code, message} in error.rs.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config`]: defaults, then `printwise.toml`, then `PRINTWISE_*`
//! environment variables.

pub mod config;
pub mod context;
pub mod dto;
pub mod error;
pub mod routes;
pub mod telemetry;

use std::sync::Arc;

use axum::Router;
use printwise_core::{TokenPolicy, WastePolicy};
use printwise_db::{Database, DbConfig, QuoteService};

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: QuoteService,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    /// Wires the service with the policies from `config`.
    pub fn new(db: Database, config: ApiConfig) -> Self {
        let token_policy = config
            .token_ttl_days
            .map(TokenPolicy::with_ttl_days)
            .unwrap_or_else(TokenPolicy::unlimited);

        let service = QuoteService::new(db)
            .with_waste_policy(WastePolicy::new(config.waste_threshold))
            .with_token_policy(token_policy);

        AppState {
            service,
            config: Arc::new(config),
        }
    }

    /// Opens the configured database (running migrations) and wires the state.
    pub async fn connect(config: ApiConfig) -> Result<Self, printwise_db::DbError> {
        let db_config =
            DbConfig::new(config.database_path.clone()).max_connections(config.max_connections);
        let db = Database::new(db_config).await?;
        Ok(Self::new(db, config))
    }
}

/// Builds the full HTTP router (used by `main.rs` and the black-box tests).
pub fn build_app(state: AppState) -> Router {
    routes::router().with_state(state)
}
