//! Read-only aggregate views. Every call recomputes from source rows; the
//! derived CO2 figure is a fixed linear multiple of recycled weight (see
//! `models::stats`), not measured data.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserStatsQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CollectorStatsQuery {
    pub collector_id: Option<String>,
}

/// GET /stats/system
pub async fn system(State(state): State<AppState>) -> Result<Response, ApiError> {
    let stats = state.store.system_stats().await?;
    Ok(ApiResponse::success(stats).into_response())
}

/// GET /stats/user?user_id=
pub async fn user(
    State(state): State<AppState>,
    Query(query): Query<UserStatsQuery>,
) -> Result<Response, ApiError> {
    let user_id = query
        .user_id
        .as_deref()
        .ok_or_else(|| ApiError::validation("MISSING_USER_ID", "User ID is required"))?;

    let stats = state.store.user_stats(user_id).await?;
    Ok(ApiResponse::success(stats).into_response())
}

/// GET /stats/collector?collector_id=
pub async fn collector(
    State(state): State<AppState>,
    Query(query): Query<CollectorStatsQuery>,
) -> Result<Response, ApiError> {
    let collector_id = query
        .collector_id
        .as_deref()
        .ok_or_else(|| ApiError::validation("MISSING_COLLECTOR_ID", "Collector ID is required"))?;

    let stats = state.store.collector_stats(collector_id).await?;
    Ok(ApiResponse::success(stats).into_response())
}
