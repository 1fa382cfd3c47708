use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Scheduled waste pickup. Owner-scoped: all reads and mutations are filtered
/// to the authenticated creator. Lifecycle: pending → assigned → in-progress
/// → completed, or cancelled from any non-terminal state; collector_id and
/// actual_weight are populated once the pickup has progressed past pending.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Pickup {
    pub id: i64,
    pub user_id: String,
    pub waste_type: String,
    pub pickup_date: String,
    pub pickup_time: String,
    pub address: String,
    pub estimated_weight: f64,
    pub actual_weight: Option<f64>,
    pub notes: Option<String>,
    pub status: String,
    pub collector_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewPickup {
    pub user_id: String,
    pub waste_type: String,
    pub pickup_date: String,
    pub pickup_time: String,
    pub address: String,
    pub estimated_weight: f64,
    pub notes: Option<String>,
}

/// Partial update. Outer `Option` is field presence in the request body; the
/// inner `Option` is the stored nullability.
#[derive(Debug, Clone, Default)]
pub struct PickupChanges {
    pub status: Option<String>,
    pub collector_id: Option<Option<String>>,
    pub actual_weight: Option<Option<f64>>,
    pub notes: Option<Option<String>>,
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

impl PickupChanges {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.collector_id.is_none()
            && self.actual_weight.is_none()
            && self.notes.is_none()
            && self.completed_at.is_none()
    }
}

/// List filter. `owner_id` is the implicit base scope; the rest narrow it.
#[derive(Debug, Clone)]
pub struct PickupQuery {
    pub owner_id: String,
    pub status: Option<String>,
    pub user_id: Option<String>,
    pub collector_id: Option<String>,
    pub limit: i64,
    pub offset: i64,
}
