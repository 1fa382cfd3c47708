use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::route_stop::RouteStop;

/// Collection route. Keyed by collector_id rather than an owner; carries no
/// per-record access control. Lifecycle: planned → active → completed.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: i64,
    pub name: String,
    pub collector_id: String,
    pub status: String,
    pub total_distance: f64,
    pub total_pickups: i32,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Get-by-id representation: the route with its stops inlined in traversal
/// order (ascending stop_order).
#[derive(Debug, Clone, Serialize)]
pub struct RouteDetail {
    #[serde(flatten)]
    pub route: Route,
    pub stops: Vec<RouteStop>,
}

#[derive(Debug, Clone)]
pub struct NewRoute {
    pub name: String,
    pub collector_id: String,
    pub total_distance: f64,
    pub total_pickups: i32,
}

/// collector_id is immutable after creation and deliberately absent here.
#[derive(Debug, Clone, Default)]
pub struct RouteChanges {
    pub status: Option<String>,
    pub start_time: Option<Option<DateTime<Utc>>>,
    pub end_time: Option<Option<DateTime<Utc>>>,
}

impl RouteChanges {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.start_time.is_none() && self.end_time.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct RouteQuery {
    pub collector_id: Option<String>,
    pub status: Option<String>,
    pub limit: i64,
    pub offset: i64,
}
