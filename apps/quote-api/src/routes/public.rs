//! Token-gated routes the client opens from the share link.
//!
//! A wrong, malformed or expired token is always a plain 404.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use printwise_core::{PublicQuoteView, Quote};

use crate::context::PublicContext;
use crate::dto::RejectRequest;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/quotes/view/{token}", get(view_quote))
        .route("/quotes/approve/{token}", post(approve_quote))
        .route("/quotes/reject/{token}", post(reject_quote))
}

pub async fn view_quote(
    State(state): State<AppState>,
    PublicContext(ctx): PublicContext,
    Path(token): Path<String>,
) -> ApiResult<Json<PublicQuoteView>> {
    Ok(Json(state.service.view_by_token(&ctx, &token).await?))
}

pub async fn approve_quote(
    State(state): State<AppState>,
    PublicContext(ctx): PublicContext,
    Path(token): Path<String>,
) -> ApiResult<Json<Quote>> {
    Ok(Json(state.service.approve(&ctx, &token).await?))
}

pub async fn reject_quote(
    State(state): State<AppState>,
    PublicContext(ctx): PublicContext,
    Path(token): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Quote>> {
    let request: RejectRequest = if body.iter().all(u8::is_ascii_whitespace) {
        RejectRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::validation(e.to_string()))?
    };

    let quote = state
        .service
        .reject(&ctx, &token, request.reason.as_deref())
        .await?;
    Ok(Json(quote))
}
