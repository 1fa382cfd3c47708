use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Issued bearer-token session. Deleting the row revokes the token.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}
