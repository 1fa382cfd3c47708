use axum::{
    extract::{rejection::JsonRejection, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::{NewRoute, RouteChanges, RouteDetail, RouteQuery};
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::state::AppState;
use crate::validation::{allowed_list, is_one_of, ROUTE_STATUSES};

use super::input::{
    as_object, page_params, parse_timestamp, reject_identity_fields, require_id, require_present,
    require_string, IdQuery,
};

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 100;

/// collector_id is immutable after creation, so it is banned from update
/// bodies alongside the owner-identity spellings.
const IDENTITY_FIELDS: &[&str] = &["userId", "user_id", "collectorId", "collector_id"];

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub id: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub status: Option<String>,
    pub collector_id: Option<String>,
}

/// GET /routes — single route (with ordered stops inlined) via ?id=,
/// otherwise a list ordered by creation time descending.
pub async fn get(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    if let Some(raw) = query.id.as_deref() {
        let id = require_id(Some(raw), "INVALID_ID", "Valid ID is required")?;
        let route = state
            .store
            .route_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("ROUTE_NOT_FOUND", "Route not found"))?;
        let stops = state.store.stops_for_route(id).await?;
        return Ok(ApiResponse::success(RouteDetail { route, stops }).into_response());
    }

    if let Some(status) = query.status.as_deref() {
        if !is_one_of(status, ROUTE_STATUSES) {
            return Err(ApiError::validation(
                "INVALID_STATUS",
                format!(
                    "Invalid status. Must be one of: {}",
                    allowed_list(ROUTE_STATUSES)
                ),
            ));
        }
    }

    let (limit, offset) = page_params(query.limit, query.offset, DEFAULT_LIMIT, MAX_LIMIT);
    let results = state
        .store
        .list_routes(RouteQuery {
            collector_id: query.collector_id,
            status: query.status,
            limit,
            offset,
        })
        .await?;

    Ok(ApiResponse::success(results).into_response())
}

/// POST /routes — create in planned status.
pub async fn post(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let body = as_object(&body)?;
    reject_identity_fields(body, &["userId", "user_id"])?;

    let name = require_string(body, "name", "MISSING_NAME", "Route name is required")?;
    let collector_id = require_string(
        body,
        "collectorId",
        "MISSING_COLLECTOR_ID",
        "Collector ID is required",
    )?;
    require_present(
        body,
        "totalDistance",
        "MISSING_TOTAL_DISTANCE",
        "Total distance is required",
    )?;
    require_present(
        body,
        "totalPickups",
        "MISSING_TOTAL_PICKUPS",
        "Total pickups is required",
    )?;

    let total_distance = match body.get("totalDistance").and_then(Value::as_f64) {
        Some(distance) if distance >= 0.0 => distance,
        _ => {
            return Err(ApiError::validation(
                "INVALID_TOTAL_DISTANCE",
                "Total distance must be a positive number",
            ))
        }
    };

    let total_pickups = match body.get("totalPickups").and_then(Value::as_i64) {
        Some(count) if count >= 0 && count <= i32::MAX as i64 => count as i32,
        _ => {
            return Err(ApiError::validation(
                "INVALID_TOTAL_PICKUPS",
                "Total pickups must be a positive integer",
            ))
        }
    };

    let route = state
        .store
        .insert_route(NewRoute {
            name,
            collector_id,
            total_distance,
            total_pickups,
        })
        .await?;

    Ok(ApiResponse::created(route).into_response())
}

/// PUT /routes?id= — status/startTime/endTime only; collector identity is
/// immutable post-creation.
pub async fn put(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id = require_id(query.id.as_deref(), "INVALID_ID", "Valid ID is required")?;

    let Json(body) = body?;
    let body = as_object(&body)?;
    reject_identity_fields(body, IDENTITY_FIELDS)?;

    let mut changes = RouteChanges::default();

    if let Some(value) = body.get("status").filter(|v| !v.is_null()) {
        let status = value.as_str().unwrap_or_default();
        if !is_one_of(status, ROUTE_STATUSES) {
            return Err(ApiError::validation(
                "INVALID_STATUS",
                format!(
                    "Invalid status. Must be one of: {}",
                    allowed_list(ROUTE_STATUSES)
                ),
            ));
        }
        changes.status = Some(status.to_string());
    }

    if let Some(value) = body.get("startTime") {
        changes.start_time = Some(parse_timestamp(
            value,
            "INVALID_START_TIME",
            "Start time must be a valid ISO timestamp string",
        )?);
    }

    if let Some(value) = body.get("endTime") {
        changes.end_time = Some(parse_timestamp(
            value,
            "INVALID_END_TIME",
            "End time must be a valid ISO timestamp string",
        )?);
    }

    if changes.is_empty() {
        return Err(ApiError::validation("NO_UPDATES", "No valid fields to update"));
    }

    let updated = state
        .store
        .update_route(id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("ROUTE_NOT_FOUND", "Route not found"))?;

    Ok(ApiResponse::success(updated).into_response())
}

/// DELETE /routes?id=
pub async fn delete(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Response, ApiError> {
    let id = require_id(query.id.as_deref(), "INVALID_ID", "Valid ID is required")?;

    let deleted = state
        .store
        .delete_route(id)
        .await?
        .ok_or_else(|| ApiError::not_found("ROUTE_NOT_FOUND", "Route not found"))?;

    Ok(ApiResponse::success(json!({
        "message": "Route deleted successfully",
        "route": deleted,
    }))
    .into_response())
}
