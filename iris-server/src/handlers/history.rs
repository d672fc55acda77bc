//! History handlers
//!
//! Listing, single-result lookup and bulk clearing of stored palettes.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use iris_core::DEFAULT_HISTORY_LIMIT;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::ApiError;
use crate::handlers::response::{ClearHistoryResponse, HistoryResponse, PaletteResultResponse};
use crate::state::AppState;

/// Query parameters for the history listing
#[derive(Debug, Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Maximum results, clamped to 1..=100 (default: 20)
    pub limit: Option<i64>,
}

/// List stored palettes, newest first
#[utoipa::path(
    get,
    path = "/api/history",
    tag = "History",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Most recent results", body = HistoryResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn history_handler(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let limit = query
        .limit
        .map_or(DEFAULT_HISTORY_LIMIT, |l| usize::try_from(l).unwrap_or(0));
    let results = state.service.history(limit).await?;

    Ok(Json(HistoryResponse {
        results: results.into_iter().map(Into::into).collect(),
    }))
}

/// Fetch one stored palette
#[utoipa::path(
    get,
    path = "/api/result/{id}",
    tag = "History",
    params(("id" = i64, Path, description = "Result identifier")),
    responses(
        (status = 200, description = "The stored result", body = PaletteResultResponse),
        (status = 404, description = "No result with this id")
    )
)]
pub async fn result_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PaletteResultResponse>, ApiError> {
    let result = state
        .service
        .result(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Result not found."))?;

    Ok(Json(result.into()))
}

/// Delete every stored palette and its image
#[utoipa::path(
    post,
    path = "/api/history/clear",
    tag = "History",
    responses(
        (status = 200, description = "History cleared", body = ClearHistoryResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn clear_history_handler(
    State(state): State<AppState>,
) -> Result<Json<ClearHistoryResponse>, ApiError> {
    let removed = state.service.clear_history().await?;
    Ok(Json(ClearHistoryResponse { ok: true, removed }))
}
