//! Staff quote management.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use printwise_core::{Finishing, PriceRequest, Quote, QuoteDetails, QuoteId};
use printwise_db::QuoteDraft;

use crate::context::{ApiJson, StaffContext};
use crate::dto::{FinishingsParams, ListQuotesParams, PreviewResponse, StaffQuoteResponse};
use crate::error::ApiResult;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/quotes", post(create_quote).get(list_quotes))
        .route("/quotes/calculate", post(calculate))
        .route(
            "/quotes/{id}",
            get(get_quote).put(update_quote).delete(delete_quote),
        )
        .route("/finishings", get(list_finishings))
}

fn with_share_url(state: &AppState, details: QuoteDetails) -> StaffQuoteResponse {
    let share_url = state.config.share_url(details.quote.token.as_str());
    StaffQuoteResponse { details, share_url }
}

pub async fn calculate(
    State(state): State<AppState>,
    StaffContext(ctx): StaffContext,
    ApiJson(request): ApiJson<PriceRequest>,
) -> ApiResult<Json<PreviewResponse>> {
    let priced = state.service.preview(&ctx, &request).await?;
    Ok(Json(priced.into()))
}

pub async fn create_quote(
    State(state): State<AppState>,
    StaffContext(ctx): StaffContext,
    ApiJson(draft): ApiJson<QuoteDraft>,
) -> ApiResult<(StatusCode, Json<StaffQuoteResponse>)> {
    let details = state.service.create_quote(&ctx, &draft).await?;
    Ok((StatusCode::CREATED, Json(with_share_url(&state, details))))
}

pub async fn list_quotes(
    State(state): State<AppState>,
    StaffContext(_): StaffContext,
    params: Result<Query<ListQuotesParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Quote>>> {
    let Query(params) = params?;
    Ok(Json(state.service.list_quotes(params.status).await?))
}

pub async fn get_quote(
    State(state): State<AppState>,
    StaffContext(_): StaffContext,
    id: Result<Path<QuoteId>, PathRejection>,
) -> ApiResult<Json<StaffQuoteResponse>> {
    let Path(id) = id?;
    let details = state.service.get_quote(id).await?;
    Ok(Json(with_share_url(&state, details)))
}

pub async fn update_quote(
    State(state): State<AppState>,
    StaffContext(ctx): StaffContext,
    id: Result<Path<QuoteId>, PathRejection>,
    ApiJson(draft): ApiJson<QuoteDraft>,
) -> ApiResult<Json<StaffQuoteResponse>> {
    let Path(id) = id?;
    let details = state.service.update_quote(&ctx, id, &draft).await?;
    Ok(Json(with_share_url(&state, details)))
}

pub async fn delete_quote(
    State(state): State<AppState>,
    StaffContext(ctx): StaffContext,
    id: Result<Path<QuoteId>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    state.service.delete_quote(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_finishings(
    State(state): State<AppState>,
    StaffContext(_): StaffContext,
    params: Result<Query<FinishingsParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Finishing>>> {
    let Query(params) = params?;
    Ok(Json(state.service.finishings_for_format(params.format).await?))
}
