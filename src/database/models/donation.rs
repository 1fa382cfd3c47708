use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Reusable-item donation. Owner-scoped to the donor; ngo_id is assigned when
/// an NGO accepts. Lifecycle: pending → accepted|rejected; accepted →
/// picked-up → delivered. updated_at is bumped on every mutation.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: i64,
    pub user_id: String,
    pub ngo_id: Option<String>,
    pub item_type: String,
    pub item_name: String,
    pub condition: String,
    pub quantity: i32,
    pub description: String,
    pub pickup_address: String,
    pub contact_number: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDonation {
    pub user_id: String,
    pub ngo_id: Option<String>,
    pub item_type: String,
    pub item_name: String,
    pub condition: String,
    pub quantity: i32,
    pub description: String,
    pub pickup_address: String,
    pub contact_number: String,
}

#[derive(Debug, Clone, Default)]
pub struct DonationChanges {
    pub status: Option<String>,
    pub ngo_id: Option<Option<String>>,
}

impl DonationChanges {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.ngo_id.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct DonationQuery {
    pub owner_id: String,
    pub status: Option<String>,
    pub user_id: Option<String>,
    pub ngo_id: Option<String>,
    pub limit: i64,
    pub offset: i64,
}
