use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::auth::validate_jwt;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller context, resolved from the bearer token and injected
/// into request extensions for downstream handlers.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
    pub session_id: String,
}

/// Bearer-token authentication gate. Every owner-scoped endpoint sits behind
/// this; on failure the request is rejected before any handler logic runs.
pub async fn require_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(&headers).ok_or_else(ApiError::unauthorized)?;

    let claims = validate_jwt(&token).map_err(|msg| {
        tracing::warn!("rejected bearer token: {}", msg);
        ApiError::unauthorized()
    })?;

    // Tokens remain valid only while their session row exists and is fresh;
    // logout revokes by deleting the row.
    let session = state.store.session_by_id(&claims.sid).await?;
    let valid = session
        .map(|s| s.user_id == claims.sub && s.expires_at > Utc::now())
        .unwrap_or(false);
    if !valid {
        return Err(ApiError::unauthorized());
    }

    request.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
        email: claims.email,
        session_id: claims.sid,
    });

    Ok(next.run(request).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers.get("authorization")?.to_str().ok()?;
    let token = auth_header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
