//! HTTP routes, one file per area.

use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tracing::info;

use crate::AppState;

pub mod public;
pub mod quotes;
pub mod system;
pub mod waste;

/// Router for every endpoint.
pub fn router() -> Router<AppState> {
    let admin = Router::new().merge(quotes::router()).merge(waste::router());

    Router::new()
        .route("/health", get(system::health))
        .merge(public::router())
        .nest("/admin", admin)
        .layer(ServiceBuilder::new().layer(middleware::from_fn(log_requests)))
}

/// Logs the route template, never the concrete path: public paths carry
/// capability tokens.
async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());
    let started = Instant::now();

    let response = next.run(req).await;

    info!(
        %method,
        route = %route,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Request handled"
    );
    response
}
