use axum::{
    extract::{rejection::JsonRejection, Extension, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::{DonationChanges, DonationQuery, NewDonation};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, AuthUser};
use crate::state::AppState;
use crate::validation::{allowed_list, is_one_of, CONDITIONS, DONATION_STATUSES, ITEM_TYPES};

use super::input::{
    as_object, optional_trimmed, page_params, reject_identity_fields, require_id, IdQuery,
};

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 100;

const IDENTITY_FIELDS: &[&str] = &["userId", "user_id"];

const REQUIRED_FIELDS: &[&str] = &[
    "itemType",
    "itemName",
    "condition",
    "quantity",
    "description",
    "pickupAddress",
    "contactNumber",
];

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub id: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub status: Option<String>,
    pub user_id: Option<String>,
    pub ngo_id: Option<String>,
}

/// GET /donations — single record via ?id=, otherwise a filtered list scoped
/// to the caller's own donations.
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    if let Some(raw) = query.id.as_deref() {
        let id = require_id(Some(raw), "INVALID_ID", "Valid ID is required")?;
        let donation = state
            .store
            .donation_for_user(id, &user.user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("NOT_FOUND", "Donation not found"))?;
        return Ok(ApiResponse::success(donation).into_response());
    }

    if let Some(status) = query.status.as_deref() {
        if !is_one_of(status, DONATION_STATUSES) {
            return Err(ApiError::validation(
                "INVALID_STATUS",
                format!(
                    "Invalid status. Must be one of: {}",
                    allowed_list(DONATION_STATUSES)
                ),
            ));
        }
    }

    let (limit, offset) = page_params(query.limit, query.offset, DEFAULT_LIMIT, MAX_LIMIT);
    let results = state
        .store
        .list_donations(DonationQuery {
            owner_id: user.user_id,
            status: query.status,
            user_id: query.user_id,
            ngo_id: query.ngo_id,
            limit,
            offset,
        })
        .await?;

    Ok(ApiResponse::success(results).into_response())
}

/// POST /donations — create, donor is always the caller, status pending.
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let body = as_object(&body)?;
    reject_identity_fields(body, IDENTITY_FIELDS)?;

    for field in REQUIRED_FIELDS {
        let missing = match body.get(*field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        };
        if missing {
            return Err(ApiError::validation(
                "MISSING_REQUIRED_FIELD",
                format!("{} is required", field),
            ));
        }
    }

    let item_type = body.get("itemType").and_then(Value::as_str).unwrap_or_default().trim();
    if !is_one_of(item_type, ITEM_TYPES) {
        return Err(ApiError::validation(
            "INVALID_ITEM_TYPE",
            format!(
                "Invalid item type. Must be one of: {}",
                allowed_list(ITEM_TYPES)
            ),
        ));
    }

    let condition = body.get("condition").and_then(Value::as_str).unwrap_or_default().trim();
    if !is_one_of(condition, CONDITIONS) {
        return Err(ApiError::validation(
            "INVALID_CONDITION",
            format!(
                "Invalid condition. Must be one of: {}",
                allowed_list(CONDITIONS)
            ),
        ));
    }

    let quantity = match body.get("quantity").and_then(Value::as_i64) {
        Some(quantity) if quantity > 0 && quantity <= i32::MAX as i64 => quantity as i32,
        _ => {
            return Err(ApiError::validation(
                "INVALID_QUANTITY",
                "Quantity must be a positive number",
            ))
        }
    };

    let text = |key: &str| {
        body.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string()
    };

    let donation = state
        .store
        .insert_donation(NewDonation {
            user_id: user.user_id,
            ngo_id: optional_trimmed(body.get("ngoId")),
            item_type: item_type.to_string(),
            item_name: text("itemName"),
            condition: condition.to_string(),
            quantity,
            description: text("description"),
            pickup_address: text("pickupAddress"),
            contact_number: text("contactNumber"),
        })
        .await?;

    Ok(ApiResponse::created(donation).into_response())
}

/// PUT /donations?id= — status/ngoId updates; updatedAt bumps on every
/// mutation.
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

    let mut changes = DonationChanges::default();

    if let Some(value) = body.get("status").filter(|v| !v.is_null()) {
        let status = value.as_str().unwrap_or_default();
        if !is_one_of(status, DONATION_STATUSES) {
            return Err(ApiError::validation(
                "INVALID_STATUS",
                format!(
                    "Invalid status. Must be one of: {}",
                    allowed_list(DONATION_STATUSES)
                ),
            ));
        }
        changes.status = Some(status.to_string());
    }

    if let Some(value) = body.get("ngoId") {
        changes.ngo_id = Some(optional_trimmed(Some(value)));
    }

    if changes.is_empty() {
        return Err(ApiError::validation("NO_UPDATES", "No valid fields to update"));
    }

    let updated = state
        .store
        .update_donation(id, &user.user_id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("NOT_FOUND", "Donation not found"))?;

    Ok(ApiResponse::success(updated).into_response())
}

/// DELETE /donations?id= — ownership-scoped conditional delete.
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<IdQuery>,
) -> Result<Response, ApiError> {
    let id = require_id(query.id.as_deref(), "INVALID_ID", "Valid ID is required")?;

    let deleted = state
        .store
        .delete_donation(id, &user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("NOT_FOUND", "Donation not found"))?;

    Ok(ApiResponse::success(json!({
        "message": "Donation deleted successfully",
        "donation": deleted,
    }))
    .into_response())
}
