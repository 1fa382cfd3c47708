use axum::{
    extract::{rejection::JsonRejection, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::{LocationHistoryQuery, NewTrackingLocation};
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::state::AppState;
use crate::validation::{in_range, LATITUDE_RANGE, LONGITUDE_RANGE, SPEED_RANGE};

use super::input::{
    as_object, int_like, page_params, parse_positive_int, require_present, require_string, IdQuery,
};

const HISTORY_DEFAULT_LIMIT: i64 = 100;
const HISTORY_MAX_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct CurrentQuery {
    pub collector_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub collector_id: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub route_id: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /tracking?collector_id= — the collector's most recent position.
pub async fn current(
    State(state): State<AppState>,
    Query(query): Query<CurrentQuery>,
) -> Result<Response, ApiError> {
    let collector_id = query.collector_id.as_deref().ok_or_else(|| {
        ApiError::validation("MISSING_COLLECTOR_ID", "collector_id parameter is required")
    })?;

    let location = state
        .store
        .latest_location(collector_id)
        .await?
        .ok_or_else(|| {
            ApiError::not_found("LOCATION_NOT_FOUND", "No location found for collector")
        })?;

    Ok(ApiResponse::success(location).into_response())
}

/// POST /tracking and /tracking/history — append one position. The event
/// timestamp is the server clock at insertion; client timestamps are ignored.
pub async fn record(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let body = as_object(&body)?;

    let collector_id = require_string(
        body,
        "collectorId",
        "MISSING_COLLECTOR_ID",
        "collectorId is required",
    )?;
    require_present(body, "latitude", "MISSING_LATITUDE", "latitude is required")?;
    require_present(body, "longitude", "MISSING_LONGITUDE", "longitude is required")?;

    let latitude = match body.get("latitude").and_then(Value::as_f64) {
        Some(latitude) if in_range(latitude, LATITUDE_RANGE) => latitude,
        _ => {
            return Err(ApiError::validation(
                "INVALID_LATITUDE",
                "latitude must be a number between -90 and 90",
            ))
        }
    };

    let longitude = match body.get("longitude").and_then(Value::as_f64) {
        Some(longitude) if in_range(longitude, LONGITUDE_RANGE) => longitude,
        _ => {
            return Err(ApiError::validation(
                "INVALID_LONGITUDE",
                "longitude must be a number between -180 and 180",
            ))
        }
    };

    let route_id = match body.get("routeId").filter(|v| !v.is_null()) {
        None => None,
        Some(value) => Some(int_like(value).ok_or_else(|| {
            ApiError::validation("INVALID_ROUTE_ID", "Valid route ID is required")
        })?),
    };

    let speed = match body.get("speed").filter(|v| !v.is_null()) {
        None => None,
        Some(value) => match value.as_f64() {
            Some(speed) if in_range(speed, SPEED_RANGE) => Some(speed),
            _ => {
                return Err(ApiError::validation(
                    "INVALID_SPEED",
                    "speed must be between 0 and 300 km/h",
                ))
            }
        },
    };

    let location = state
        .store
        .insert_location(NewTrackingLocation {
            collector_id,
            route_id,
            latitude,
            longitude,
            speed,
        })
        .await?;

    Ok(ApiResponse::created(location).into_response())
}

/// GET /tracking/history?collector_id= — time-windowed history, newest-first.
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Response, ApiError> {
    let collector_id = query.collector_id.clone().ok_or_else(|| {
        ApiError::validation(
            "MISSING_COLLECTOR_ID",
            "collector_id query parameter is required",
        )
    })?;

    let start_time = parse_query_timestamp(
        query.start_time.as_deref(),
        "INVALID_START_TIME",
        "start_time must be a valid ISO timestamp",
    )?;
    let end_time = parse_query_timestamp(
        query.end_time.as_deref(),
        "INVALID_END_TIME",
        "end_time must be a valid ISO timestamp",
    )?;

    // An unparseable route_id filter is ignored rather than rejected.
    let route_id = query.route_id.as_deref().and_then(parse_positive_int);

    let (limit, offset) = page_params(
        query.limit,
        query.offset,
        HISTORY_DEFAULT_LIMIT,
        HISTORY_MAX_LIMIT,
    );

    let locations = state
        .store
        .location_history(LocationHistoryQuery {
            collector_id,
            start_time,
            end_time,
            route_id,
            limit,
            offset,
        })
        .await?;

    Ok(ApiResponse::success(locations).into_response())
}

/// DELETE /tracking/history?id=
pub async fn delete(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Response, ApiError> {
    let id = query
        .id
        .as_deref()
        .and_then(parse_positive_int)
        .ok_or_else(|| ApiError::validation("INVALID_ID", "Valid ID is required"))?;

    let deleted = state
        .store
        .delete_location(id)
        .await?
        .ok_or_else(|| ApiError::not_found("NOT_FOUND", "Location record not found"))?;

    Ok(ApiResponse::success(json!({
        "message": "Location record deleted successfully",
        "record": deleted,
    }))
    .into_response())
}

fn parse_query_timestamp(
    raw: Option<&str>,
    code: &'static str,
    message: &str,
) -> Result<Option<DateTime<Utc>>, ApiError> {
    match raw {
        None => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|_| ApiError::validation(code, message.to_string())),
    }
}
