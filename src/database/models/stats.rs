use serde::Serialize;

/// Fixed CO2-offset multiplier applied to recycled weight. A presentation
/// convenience for the dashboard, not measured data.
pub const CO2_PER_KG: f64 = 2.5;

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn co2_saved(total_weight_kg: f64) -> f64 {
    round2(total_weight_kg * CO2_PER_KG)
}

/// System-wide aggregate view, recomputed from source rows on every call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStats {
    pub total_users: i64,
    pub total_pickups: i64,
    pub completed_pickups: i64,
    pub pending_pickups: i64,
    /// SUM(actual_weight) across all pickups, kg, rounded to 2 decimals.
    pub total_weight_recycled: f64,
    pub total_donations: i64,
    pub pending_donations: i64,
    /// Donations in accepted, picked-up, or delivered status.
    pub accepted_donations: i64,
}

/// Per-user aggregate view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_pickups: i64,
    pub completed_pickups: i64,
    /// Weight from completed pickups with a recorded actual_weight, kg.
    pub total_weight_recycled: f64,
    pub co2_saved: f64,
    pub total_donations: i64,
    pub accepted_donations: i64,
}

/// Per-collector aggregate view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorStats {
    pub routes_completed: i64,
    pub active_routes: i64,
    pub total_routes: i64,
    pub pickups_completed: i64,
    /// SUM(total_distance) over completed routes, km, rounded to 2 decimals.
    pub distance_traveled: f64,
}
