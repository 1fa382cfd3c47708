//! Static value tables for enum fields, shared by every resource endpoint.
//!
//! Each table is the closed set of accepted values for one string field.
//! Anything outside the set fails validation with a code naming the field
//! and a message listing the accepted values.

pub const WASTE_TYPES: &[&str] = &[
    "plastic", "metal", "paper", "glass", "ewaste", "organic", "mixed",
];

pub const PICKUP_TIMES: &[&str] = &["morning", "afternoon", "evening"];

pub const PICKUP_STATUSES: &[&str] = &[
    "pending", "assigned", "in-progress", "completed", "cancelled",
];

pub const ITEM_TYPES: &[&str] = &[
    "electronics", "furniture", "clothing", "books", "toys", "kitchenware", "other",
];

pub const CONDITIONS: &[&str] = &["excellent", "good", "fair"];

pub const DONATION_STATUSES: &[&str] = &[
    "pending", "accepted", "rejected", "picked-up", "delivered",
];

pub const ROUTE_STATUSES: &[&str] = &["planned", "active", "completed"];

pub const STOP_STATUSES: &[&str] = &["pending", "in-progress", "completed", "skipped"];

/// Donation statuses that count as "accepted" in the aggregate views.
pub const ACCEPTED_DONATION_STATUSES: &[&str] = &["accepted", "picked-up", "delivered"];

pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// Speed bound in km/h, applied uniformly at every tracking endpoint.
pub const SPEED_RANGE: (f64, f64) = (0.0, 300.0);

pub fn is_one_of(value: &str, allowed: &[&str]) -> bool {
    allowed.contains(&value)
}

/// Comma-joined value list for "Must be one of: ..." error messages.
pub fn allowed_list(allowed: &[&str]) -> String {
    allowed.join(", ")
}

pub fn in_range(value: f64, range: (f64, f64)) -> bool {
    value >= range.0 && value <= range.1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_membership() {
        assert!(is_one_of("plastic", WASTE_TYPES));
        assert!(is_one_of("ewaste", WASTE_TYPES));
        assert!(!is_one_of("nuclear", WASTE_TYPES));
        assert!(is_one_of("picked-up", DONATION_STATUSES));
        assert!(!is_one_of("pickedup", DONATION_STATUSES));
        assert!(is_one_of("skipped", STOP_STATUSES));
        assert!(!is_one_of("skipped", PICKUP_STATUSES));
    }

    #[test]
    fn coordinate_bounds_are_inclusive() {
        assert!(in_range(90.0, LATITUDE_RANGE));
        assert!(in_range(-90.0, LATITUDE_RANGE));
        assert!(!in_range(90.0001, LATITUDE_RANGE));
        assert!(in_range(180.0, LONGITUDE_RANGE));
        assert!(!in_range(-180.0001, LONGITUDE_RANGE));
    }

    #[test]
    fn allowed_list_matches_error_message_format() {
        assert_eq!(allowed_list(CONDITIONS), "excellent, good, fair");
    }
}
