//! Request context extractors.
//!
//! Staff authentication happens upstream; the proxy forwards the staff
//! member's id in `x-staff-id`. Public routes never look at it.

use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::Json;
use printwise_core::{Actor, RequestContext};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::ApiError;

pub const STAFF_ID_HEADER: &str = "x-staff-id";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Context of an authenticated staff request.
#[derive(Debug, Clone, Copy)]
pub struct StaffContext(pub RequestContext);

impl<S> FromRequestParts<S> for StaffContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(STAFF_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
            .ok_or_else(|| ApiError::unauthorized("missing or invalid x-staff-id"))?;

        Ok(StaffContext(context(&parts.headers, Actor::Staff { user_id })))
    }
}

/// Context of a public, token-gated request.
#[derive(Debug, Clone, Copy)]
pub struct PublicContext(pub RequestContext);

impl<S> FromRequestParts<S> for PublicContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(PublicContext(context(&parts.headers, Actor::TokenHolder)))
    }
}

/// Reuses the caller's `x-request-id` when it is a UUID.
fn context(headers: &HeaderMap, actor: Actor) -> RequestContext {
    let ctx = RequestContext::new(actor);

    match headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
    {
        Some(request_id) => ctx.with_request_id(request_id),
        None => ctx,
    }
}

/// `Json` whose rejections use the API error body.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}
