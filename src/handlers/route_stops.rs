use axum::{
    extract::{rejection::JsonRejection, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::database::models::{NewRouteStop, RouteStopChanges};
use crate::database::StoreError;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::state::AppState;
use crate::validation::{allowed_list, is_one_of, STOP_STATUSES, WASTE_TYPES};

use super::input::{
    as_object, int_like, parse_positive_int, parse_timestamp, require_present, require_string,
    IdQuery,
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub route_id: Option<String>,
}

/// GET /route-stops?route_id= — all stops for the route, ascending by
/// stop_order. The ordering defines the path a collector follows and is never
/// re-sorted by id or insertion time.
pub async fn get(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    let route_id = match query.route_id.as_deref() {
        None => {
            return Err(ApiError::validation(
                "MISSING_ROUTE_ID",
                "Route ID is required",
            ))
        }
        Some(raw) => parse_positive_int(raw).ok_or_else(|| {
            ApiError::validation("INVALID_ROUTE_ID", "Valid route ID is required")
        })?,
    };

    let stops = state.store.stops_for_route(route_id).await?;
    Ok(ApiResponse::success(stops).into_response())
}

/// POST /route-stops — numeric ids are coerced from string-or-number input;
/// new stops start pending.
pub async fn post(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let body = as_object(&body)?;

    let route_id_raw = require_present(body, "routeId", "MISSING_ROUTE_ID", "Route ID is required")?;
    let pickup_id_raw =
        require_present(body, "pickupId", "MISSING_PICKUP_ID", "Pickup ID is required")?;
    let stop_order_raw =
        require_present(body, "stopOrder", "MISSING_STOP_ORDER", "Stop order is required")?;
    let address = require_string(body, "address", "MISSING_ADDRESS", "Address is required")?;
    let waste_type =
        require_string(body, "wasteType", "MISSING_WASTE_TYPE", "Waste type is required")?;

    let route_id = int_like(route_id_raw)
        .ok_or_else(|| ApiError::validation("INVALID_ROUTE_ID", "Valid route ID is required"))?;
    let pickup_id = int_like(pickup_id_raw)
        .ok_or_else(|| ApiError::validation("INVALID_PICKUP_ID", "Valid pickup ID is required"))?;
    let stop_order = int_like(stop_order_raw)
        .ok_or_else(|| ApiError::validation("INVALID_STOP_ORDER", "Valid stop order is required"))?
        as i32;

    if !is_one_of(&waste_type, WASTE_TYPES) {
        return Err(ApiError::validation(
            "INVALID_WASTE_TYPE",
            format!(
                "Invalid wasteType. Must be one of: {}",
                allowed_list(WASTE_TYPES)
            ),
        ));
    }

    let stop = state
        .store
        .insert_stop(NewRouteStop {
            route_id,
            pickup_id,
            stop_order,
            address,
            waste_type,
        })
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => ApiError::conflict(
                "DUPLICATE_STOP_ORDER",
                "Stop order already used for this route",
            ),
            other => other.into(),
        })?;

    Ok(ApiResponse::created(stop).into_response())
}

/// PUT /route-stops?id= — partial update of status/arrivalTime/departureTime
/// only.
pub async fn put(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id = match query.id.as_deref() {
        None => return Err(ApiError::validation("MISSING_STOP_ID", "Stop ID is required")),
        Some(raw) => parse_positive_int(raw)
            .ok_or_else(|| ApiError::validation("INVALID_STOP_ID", "Valid stop ID is required"))?,
    };

    let Json(body) = body?;
    let body = as_object(&body)?;

    let mut changes = RouteStopChanges::default();

    if let Some(value) = body.get("status").filter(|v| !v.is_null()) {
        let status = value.as_str().unwrap_or_default();
        if !is_one_of(status, STOP_STATUSES) {
            return Err(ApiError::validation(
                "INVALID_STATUS",
                format!(
                    "Invalid status. Must be one of: {}",
                    allowed_list(STOP_STATUSES)
                ),
            ));
        }
        changes.status = Some(status.to_string());
    }

    if let Some(value) = body.get("arrivalTime") {
        changes.arrival_time = Some(parse_timestamp(
            value,
            "INVALID_ARRIVAL_TIME",
            "Arrival time must be a valid ISO timestamp string",
        )?);
    }

    if let Some(value) = body.get("departureTime") {
        changes.departure_time = Some(parse_timestamp(
            value,
            "INVALID_DEPARTURE_TIME",
            "Departure time must be a valid ISO timestamp string",
        )?);
    }

    if changes.is_empty() {
        return Err(ApiError::validation(
            "NO_UPDATE_FIELDS",
            "No valid fields to update",
        ));
    }

    let updated = state
        .store
        .update_stop(id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("STOP_NOT_FOUND", "Route stop not found"))?;

    Ok(ApiResponse::success(updated).into_response())
}
