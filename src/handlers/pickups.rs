use axum::{
    extract::{rejection::JsonRejection, Extension, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::{NewPickup, PickupChanges, PickupQuery};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, AuthUser};
use crate::state::AppState;
use crate::validation::{allowed_list, is_one_of, PICKUP_STATUSES, PICKUP_TIMES, WASTE_TYPES};

use super::input::{
    as_object, optional_trimmed, page_params, parse_timestamp, reject_identity_fields, require_id,
    require_present, require_string, IdQuery,
};

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 100;

const IDENTITY_FIELDS: &[&str] = &["userId", "user_id"];

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub id: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub status: Option<String>,
    pub user_id: Option<String>,
    pub collector_id: Option<String>,
}

/// GET /pickups — single record via ?id=, otherwise a filtered list scoped to
/// the caller's own pickups.
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    if let Some(raw) = query.id.as_deref() {
        let id = require_id(Some(raw), "INVALID_ID", "Valid ID is required")?;
        let pickup = state
            .store
            .pickup_for_user(id, &user.user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("PICKUP_NOT_FOUND", "Pickup not found"))?;
        return Ok(ApiResponse::success(pickup).into_response());
    }

    if let Some(status) = query.status.as_deref() {
        if !is_one_of(status, PICKUP_STATUSES) {
            return Err(ApiError::validation(
                "INVALID_STATUS",
                format!(
                    "Invalid status. Must be one of: {}",
                    allowed_list(PICKUP_STATUSES)
                ),
            ));
        }
    }

    let (limit, offset) = page_params(query.limit, query.offset, DEFAULT_LIMIT, MAX_LIMIT);
    let results = state
        .store
        .list_pickups(PickupQuery {
            owner_id: user.user_id,
            status: query.status,
            user_id: query.user_id,
            collector_id: query.collector_id,
            limit,
            offset,
        })
        .await?;

    Ok(ApiResponse::success(results).into_response())
}

/// POST /pickups — create, always owned by the caller and starting pending.
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let body = as_object(&body)?;
    reject_identity_fields(body, IDENTITY_FIELDS)?;

    let waste_type = require_string(body, "wasteType", "MISSING_WASTE_TYPE", "wasteType is required")?;
    let pickup_date =
        require_string(body, "pickupDate", "MISSING_PICKUP_DATE", "pickupDate is required")?;
    let pickup_time =
        require_string(body, "pickupTime", "MISSING_PICKUP_TIME", "pickupTime is required")?;
    let address = require_string(body, "address", "MISSING_ADDRESS", "address is required")?;
    require_present(
        body,
        "estimatedWeight",
        "MISSING_ESTIMATED_WEIGHT",
        "estimatedWeight is required",
    )?;

    if !is_one_of(&waste_type, WASTE_TYPES) {
        return Err(ApiError::validation(
            "INVALID_WASTE_TYPE",
            format!(
                "Invalid wasteType. Must be one of: {}",
                allowed_list(WASTE_TYPES)
            ),
        ));
    }

    if !is_one_of(&pickup_time, PICKUP_TIMES) {
        return Err(ApiError::validation(
            "INVALID_PICKUP_TIME",
            format!(
                "Invalid pickupTime. Must be one of: {}",
                allowed_list(PICKUP_TIMES)
            ),
        ));
    }

    let estimated_weight = match body.get("estimatedWeight").and_then(Value::as_f64) {
        Some(weight) if weight > 0.0 => weight,
        _ => {
            return Err(ApiError::validation(
                "INVALID_ESTIMATED_WEIGHT",
                "estimatedWeight must be a positive number",
            ))
        }
    };

    let pickup = state
        .store
        .insert_pickup(NewPickup {
            user_id: user.user_id,
            waste_type,
            pickup_date,
            pickup_time,
            address,
            estimated_weight,
            notes: optional_trimmed(body.get("notes")),
        })
        .await?;

    Ok(ApiResponse::created(pickup).into_response())
}

/// PUT /pickups?id= — partial update of status/collectorId/actualWeight/
/// notes/completedAt, conditional on ownership.
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<IdQuery>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id = require_id(query.id.as_deref(), "INVALID_ID", "Valid ID is required")?;

    let Json(body) = body?;
    let body = as_object(&body)?;
    reject_identity_fields(body, IDENTITY_FIELDS)?;

    let mut changes = PickupChanges::default();

    if let Some(value) = body.get("status").filter(|v| !v.is_null()) {
        let status = value.as_str().unwrap_or_default();
        if !is_one_of(status, PICKUP_STATUSES) {
            return Err(ApiError::validation(
                "INVALID_STATUS",
                format!(
                    "Invalid status. Must be one of: {}",
                    allowed_list(PICKUP_STATUSES)
                ),
            ));
        }
        changes.status = Some(status.to_string());

        // Completion stamps itself unless an explicit completedAt is supplied.
        if status == "completed" && !body.contains_key("completedAt") {
            changes.completed_at = Some(Some(Utc::now()));
        }
    }

    if let Some(value) = body.get("collectorId") {
        changes.collector_id = Some(optional_trimmed(Some(value)));
    }

    if let Some(value) = body.get("actualWeight") {
        changes.actual_weight = match value {
            Value::Null => Some(None),
            _ => match value.as_f64() {
                Some(weight) if weight > 0.0 => Some(Some(weight)),
                _ => {
                    return Err(ApiError::validation(
                        "INVALID_ACTUAL_WEIGHT",
                        "actualWeight must be a positive number or null",
                    ))
                }
            },
        };
    }

    if let Some(value) = body.get("notes") {
        changes.notes = Some(optional_trimmed(Some(value)));
    }

    if let Some(value) = body.get("completedAt") {
        changes.completed_at = Some(parse_timestamp(
            value,
            "INVALID_COMPLETED_AT",
            "completedAt must be a valid ISO timestamp string or null",
        )?);
    }

    if changes.is_empty() {
        return Err(ApiError::validation("NO_UPDATES", "No valid fields to update"));
    }

    let updated = state
        .store
        .update_pickup(id, &user.user_id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("PICKUP_NOT_FOUND", "Pickup not found"))?;

    Ok(ApiResponse::success(updated).into_response())
}

/// DELETE /pickups?id= — ownership-scoped conditional delete.
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<IdQuery>,
) -> Result<Response, ApiError> {
    let id = require_id(query.id.as_deref(), "INVALID_ID", "Valid ID is required")?;

    let deleted = state
        .store
        .delete_pickup(id, &user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("PICKUP_NOT_FOUND", "Pickup not found"))?;

    Ok(ApiResponse::success(json!({
        "message": "Pickup deleted successfully",
        "pickup": deleted,
    }))
    .into_response())
}
