//! Collection statistics, reference data, and health endpoints

use axum::extract::State;
use axum::Json;

use crate::error::ApiResult;
use crate::models::*;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/stats",
    responses(
        (status = 200, description = "Collection statistics snapshot", body = StatsResponse)
    ),
    tag = "stats"
)]
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    let stats = state.catalog.stats().await?;
    Ok(Json(stats.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/sources",
    responses(
        (status = 200, description = "Known content providers", body = Vec<SourceResponse>)
    ),
    tag = "stats"
)]
pub async fn list_sources(State(state): State<AppState>) -> ApiResult<Json<Vec<SourceResponse>>> {
    let sources = state.catalog.list_sources().await?;
    Ok(Json(sources.into_iter().map(SourceResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "bookhouse-api".to_string(),
    })
}
