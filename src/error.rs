// HTTP API error envelope
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::StoreError;

/// API failure with an HTTP status, a human-readable message, and a stable
/// machine code token clients can branch on instead of parsing prose.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: Option<&'static str>,
}

impl ApiError {
    /// 400 with a field-level validation code (e.g. `INVALID_WASTE_TYPE`).
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            code: Some(code),
        }
    }

    /// 400 for structurally malformed request bodies.
    pub fn invalid_json(message: impl Into<String>) -> Self {
        Self::validation("INVALID_JSON", message)
    }

    /// 401 — no resolvable caller identity. Short-circuits the request.
    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "Authentication required".to_string(),
            code: Some("AUTH_REQUIRED"),
        }
    }

    /// 401 with a specific code (login failures).
    pub fn unauthorized_with(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
            code: Some(code),
        }
    }

    /// 404 — valid id syntax but no visible matching record.
    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
            code: Some(code),
        }
    }

    /// 409 — uniqueness conflict (duplicate email at signup).
    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
            code: Some(code),
        }
    }

    /// 500 — unexpected failure, surfaced with a generic code after logging.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("Internal server error: {}", message.into()),
            code: Some("INTERNAL_SERVER_ERROR"),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> Option<&'static str> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn to_json(&self) -> Value {
        match self.code {
            Some(code) => json!({ "error": self.message, "code": code }),
            None => json!({ "error": self.message }),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        // Never leak SQL or connection details to clients.
        tracing::error!("store error: {}", err);
        ApiError::internal(err.to_string())
    }
}

impl From<axum::extract::rejection::JsonRejection> for ApiError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        ApiError::invalid_json(rejection.body_text())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.to_json())).into_response()
    }
}
