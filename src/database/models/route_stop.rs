use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// One pickup within a route. stop_order is an ordering key, not a grouping
/// key: a route's stops are always returned ascending by it.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RouteStop {
    pub id: i64,
    pub route_id: i64,
    pub pickup_id: i64,
    pub stop_order: i32,
    pub address: String,
    pub waste_type: String,
    pub status: String,
    pub arrival_time: Option<DateTime<Utc>>,
    pub departure_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewRouteStop {
    pub route_id: i64,
    pub pickup_id: i64,
    pub stop_order: i32,
    pub address: String,
    pub waste_type: String,
}

#[derive(Debug, Clone, Default)]
pub struct RouteStopChanges {
    pub status: Option<String>,
    pub arrival_time: Option<Option<DateTime<Utc>>>,
    pub departure_time: Option<Option<DateTime<Utc>>>,
}

impl RouteStopChanges {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.arrival_time.is_none() && self.departure_time.is_none()
    }
}
