//! Shared request-input helpers for the resource endpoints.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// `?id=` query parameter, parsed leniently so the handler can emit the
/// endpoint's own error code.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

/// Request bodies must be JSON objects; anything else is structurally invalid.
pub fn as_object(body: &Value) -> Result<&Map<String, Value>, ApiError> {
    body.as_object()
        .ok_or_else(|| ApiError::invalid_json("Request body must be a JSON object"))
}

/// Owner identity always comes from the authenticated caller; bodies that try
/// to supply it are rejected outright.
pub fn reject_identity_fields(body: &Map<String, Value>, fields: &[&str]) -> Result<(), ApiError> {
    if fields.iter().any(|f| body.contains_key(*f)) {
        return Err(ApiError::validation(
            "USER_ID_NOT_ALLOWED",
            "User ID cannot be provided in request body",
        ));
    }
    Ok(())
}

/// Strictly-parsed positive integer; "12abc" and "0" both fail.
pub fn parse_positive_int(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

/// Query-string record ids.
pub fn require_id(raw: Option<&str>, code: &'static str, message: &str) -> Result<i64, ApiError> {
    raw.and_then(parse_positive_int)
        .ok_or_else(|| ApiError::validation(code, message.to_string()))
}

/// Integer accepted as either a JSON number or a numeric string.
pub fn int_like(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Required non-empty string field, trimmed before storage.
pub fn require_string(
    body: &Map<String, Value>,
    key: &str,
    code: &'static str,
    message: &str,
) -> Result<String, ApiError> {
    match body.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(ApiError::validation(code, message.to_string())),
    }
}

/// Required field presence: the key must exist with a non-null value. Type
/// and range checks stay with the caller so validation order matches the
/// endpoint contract.
pub fn require_present<'a>(
    body: &'a Map<String, Value>,
    key: &str,
    code: &'static str,
    message: &str,
) -> Result<&'a Value, ApiError> {
    body.get(key)
        .filter(|v| !v.is_null())
        .ok_or_else(|| ApiError::validation(code, message.to_string()))
}

/// Optional nullable string: absent, null, and blank all collapse to None.
pub fn optional_trimmed(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Nullable RFC 3339 timestamp field: null clears, a valid string sets.
pub fn parse_timestamp(
    value: &Value,
    code: &'static str,
    message: &str,
) -> Result<Option<DateTime<Utc>>, ApiError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|_| ApiError::validation(code, message.to_string())),
        _ => Err(ApiError::validation(code, message.to_string())),
    }
}

/// Clamp client pagination: limit is capped server-side, offset floors at 0.
pub fn page_params(
    limit: Option<i64>,
    offset: Option<i64>,
    default_limit: i64,
    max_limit: i64,
) -> (i64, i64) {
    let limit = limit.unwrap_or(default_limit).min(max_limit).max(0);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn positive_int_parsing_is_strict() {
        assert_eq!(parse_positive_int("42"), Some(42));
        assert_eq!(parse_positive_int(" 7 "), Some(7));
        assert_eq!(parse_positive_int("12abc"), None);
        assert_eq!(parse_positive_int("0"), None);
        assert_eq!(parse_positive_int("-3"), None);
    }

    #[test]
    fn identity_fields_rejected_in_any_spelling() {
        let body = json!({"userId": "u1"});
        let map = body.as_object().unwrap();
        assert!(reject_identity_fields(map, &["userId", "user_id"]).is_err());

        let body = json!({"user_id": "u1"});
        let map = body.as_object().unwrap();
        assert!(reject_identity_fields(map, &["userId", "user_id"]).is_err());

        let body = json!({"wasteType": "plastic"});
        let map = body.as_object().unwrap();
        assert!(reject_identity_fields(map, &["userId", "user_id"]).is_ok());
    }

    #[test]
    fn int_like_coerces_strings() {
        assert_eq!(int_like(&json!(5)), Some(5));
        assert_eq!(int_like(&json!("5")), Some(5));
        assert_eq!(int_like(&json!("5.5")), None);
        assert_eq!(int_like(&json!(null)), None);
    }

    #[test]
    fn presence_accepts_zero_but_not_null() {
        let body = json!({"stopOrder": 0, "gap": null});
        let map = body.as_object().unwrap();
        assert!(require_present(map, "stopOrder", "MISSING_STOP_ORDER", "required").is_ok());
        assert!(require_present(map, "gap", "MISSING_GAP", "required").is_err());
        assert!(require_present(map, "absent", "MISSING_ABSENT", "required").is_err());
    }

    #[test]
    fn limit_is_clamped_offset_floored() {
        assert_eq!(page_params(Some(500), Some(-2), 50, 100), (100, 0));
        assert_eq!(page_params(None, None, 50, 100), (50, 0));
        assert_eq!(page_params(Some(10), Some(20), 50, 100), (10, 20));
    }

    #[test]
    fn timestamps_parse_or_clear() {
        let ts = parse_timestamp(&json!("2025-01-01T10:00:00Z"), "INVALID_START_TIME", "bad")
            .unwrap()
            .unwrap();
        assert_eq!(ts.timestamp(), 1735725600);
        assert_eq!(
            parse_timestamp(&json!(null), "INVALID_START_TIME", "bad").unwrap(),
            None
        );
        assert!(parse_timestamp(&json!("yesterday"), "INVALID_START_TIME", "bad").is_err());
        assert!(parse_timestamp(&json!(12), "INVALID_START_TIME", "bad").is_err());
    }
}
