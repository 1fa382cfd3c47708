use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Append-only GPS breadcrumb. The timestamp is stamped by the server at
/// insertion; client-supplied timestamps are never accepted. A collector's
/// "current location" is the row with the greatest timestamp.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TrackingLocation {
    pub id: i64,
    pub collector_id: String,
    pub route_id: Option<i64>,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
    pub speed: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct NewTrackingLocation {
    pub collector_id: String,
    pub route_id: Option<i64>,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: Option<f64>,
}

/// History window filter; results are returned newest-first.
#[derive(Debug, Clone)]
pub struct LocationHistoryQuery {
    pub collector_id: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub route_id: Option<i64>,
    pub limit: i64,
    pub offset: i64,
}
