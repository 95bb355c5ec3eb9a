//! Staff waste reconciliation and report.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use printwise_core::{WasteInput, WasteRecord};
use printwise_db::WasteReport;

use crate::context::{ApiJson, StaffContext};
use crate::error::ApiResult;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/waste", post(reconcile).get(report))
}

pub async fn reconcile(
    State(state): State<AppState>,
    StaffContext(ctx): StaffContext,
    ApiJson(input): ApiJson<WasteInput>,
) -> ApiResult<(StatusCode, Json<WasteRecord>)> {
    let record = state.service.reconcile_waste(&ctx, &input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn report(
    State(state): State<AppState>,
    StaffContext(_): StaffContext,
) -> ApiResult<Json<WasteReport>> {
    Ok(Json(state.service.waste_report().await?))
}
