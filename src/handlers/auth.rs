//! Account and session endpoints. Tokens are server-signed bearer JWTs tied
//! to a sessions row; deleting the row revokes the token.

use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{generate_jwt, hash_password, verify_password, Claims};
use crate::config;
use crate::database::models::{NewUser, Session};
use crate::database::StoreError;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, AuthUser};
use crate::state::AppState;

use super::input::as_object;

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let body = as_object(&body)?;

    let email = extract_email(body)?;
    let password = extract_password(body)?;
    let name = body
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);

    let user = state
        .store
        .create_user(NewUser {
            id: Uuid::new_v4().to_string(),
            email,
            name,
            password_hash: hash_password(&password),
        })
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => {
                ApiError::conflict("EMAIL_IN_USE", "Email is already registered")
            }
            other => other.into(),
        })?;

    tracing::info!(user_id = %user.id, "registered user");
    Ok(ApiResponse::created(user).into_response())
}

/// POST /auth/login — verifies credentials, records a session, returns the
/// bearer token.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let body = as_object(&body)?;

    let email = extract_email(body)?;
    let password = extract_password(body)?;

    let user = state.store.user_by_email(&email).await?;
    let user = match user {
        Some(user) if verify_password(&password, &user.password_hash) => user,
        _ => {
            tracing::warn!("failed login attempt for {}", email);
            return Err(ApiError::unauthorized_with(
                "INVALID_CREDENTIALS",
                "Invalid email or password",
            ));
        }
    };

    let expiry_hours = config::config().security.jwt_expiry_hours;
    let session = state
        .store
        .create_session(Session {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            expires_at: Utc::now() + Duration::hours(expiry_hours as i64),
            ip_address: None,
            user_agent: headers
                .get("user-agent")
                .and_then(|v| v.to_str().ok())
                .map(String::from),
        })
        .await?;

    let claims = Claims::new(user.id.clone(), user.email.clone(), session.id.clone());
    let token = generate_jwt(&claims).map_err(|e| {
        tracing::error!("token generation failed: {}", e);
        ApiError::internal("could not issue token")
    })?;

    Ok(ApiResponse::success(json!({
        "token": token,
        "user": user,
        "expiresAt": session.expires_at,
    }))
    .into_response())
}

/// GET /auth/whoami
pub async fn whoami(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Response, ApiError> {
    let user = state
        .store
        .user_by_id(&auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("NOT_FOUND", "User not found"))?;

    Ok(ApiResponse::success(user).into_response())
}

/// DELETE /auth/session — revokes the current session (logout).
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Response, ApiError> {
    state.store.delete_session(&auth.session_id).await?;
    Ok(ApiResponse::success(json!({ "message": "Logged out successfully" })).into_response())
}

fn extract_email(body: &serde_json::Map<String, Value>) -> Result<String, ApiError> {
    match body.get("email").and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_lowercase()),
        _ => Err(ApiError::validation(
            "MISSING_REQUIRED_FIELD",
            "email is required",
        )),
    }
}

fn extract_password(body: &serde_json::Map<String, Value>) -> Result<String, ApiError> {
    match body.get("password").and_then(Value::as_str) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(ApiError::validation(
            "MISSING_REQUIRED_FIELD",
            "password is required",
        )),
    }
}
