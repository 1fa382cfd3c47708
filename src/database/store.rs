use async_trait::async_trait;
use thiserror::Error;

use super::models::{
    CollectorStats, Donation, DonationChanges, DonationQuery, LocationHistoryQuery, NewDonation,
    NewPickup, NewRoute, NewRouteStop, NewTrackingLocation, NewUser, Pickup, PickupChanges,
    PickupQuery, Route, RouteChanges, RouteQuery, RouteStop, RouteStopChanges, Session,
    SystemStats, TrackingLocation, User, UserStats,
};

/// Errors from the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Unique constraint violated: {0}")]
    Conflict(&'static str),

    #[error("Query error: {0}")]
    Query(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage contract for the data-access layer. Implemented by `PgStore`
/// (Postgres via sqlx) and `MemoryStore` (tests and `--memory` mode).
///
/// Mutations that target a single record take the identifying scope (id, and
/// owner id where the entity is owner-scoped) and apply one conditional
/// statement: `Ok(None)` means no matching visible record existed, which the
/// endpoint layer maps to 404. There is no separate existence check, so a
/// concurrent delete cannot race a half-applied update.
#[async_trait]
pub trait Store: Send + Sync {
    async fn health(&self) -> StoreResult<()>;

    // Users
    async fn create_user(&self, new: NewUser) -> StoreResult<User>;
    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn user_by_id(&self, id: &str) -> StoreResult<Option<User>>;

    // Sessions
    async fn create_session(&self, session: Session) -> StoreResult<Session>;
    async fn session_by_id(&self, id: &str) -> StoreResult<Option<Session>>;
    async fn delete_session(&self, id: &str) -> StoreResult<bool>;

    // Pickups (owner-scoped)
    async fn insert_pickup(&self, new: NewPickup) -> StoreResult<Pickup>;
    async fn pickup_for_user(&self, id: i64, user_id: &str) -> StoreResult<Option<Pickup>>;
    async fn list_pickups(&self, query: PickupQuery) -> StoreResult<Vec<Pickup>>;
    async fn update_pickup(
        &self,
        id: i64,
        user_id: &str,
        changes: PickupChanges,
    ) -> StoreResult<Option<Pickup>>;
    async fn delete_pickup(&self, id: i64, user_id: &str) -> StoreResult<Option<Pickup>>;

    // Donations (owner-scoped)
    async fn insert_donation(&self, new: NewDonation) -> StoreResult<Donation>;
    async fn donation_for_user(&self, id: i64, user_id: &str) -> StoreResult<Option<Donation>>;
    async fn list_donations(&self, query: DonationQuery) -> StoreResult<Vec<Donation>>;
    async fn update_donation(
        &self,
        id: i64,
        user_id: &str,
        changes: DonationChanges,
    ) -> StoreResult<Option<Donation>>;
    async fn delete_donation(&self, id: i64, user_id: &str) -> StoreResult<Option<Donation>>;

    // Routes
    async fn insert_route(&self, new: NewRoute) -> StoreResult<Route>;
    async fn route_by_id(&self, id: i64) -> StoreResult<Option<Route>>;
    /// Ordered by created_at descending.
    async fn list_routes(&self, query: RouteQuery) -> StoreResult<Vec<Route>>;
    async fn update_route(&self, id: i64, changes: RouteChanges) -> StoreResult<Option<Route>>;
    async fn delete_route(&self, id: i64) -> StoreResult<Option<Route>>;

    // Route stops
    async fn insert_stop(&self, new: NewRouteStop) -> StoreResult<RouteStop>;
    /// Ordered ascending by stop_order — traversal order, load-bearing.
    async fn stops_for_route(&self, route_id: i64) -> StoreResult<Vec<RouteStop>>;
    async fn update_stop(
        &self,
        id: i64,
        changes: RouteStopChanges,
    ) -> StoreResult<Option<RouteStop>>;

    // Tracking locations (append-only)
    async fn insert_location(&self, new: NewTrackingLocation) -> StoreResult<TrackingLocation>;
    async fn latest_location(&self, collector_id: &str) -> StoreResult<Option<TrackingLocation>>;
    /// Ordered newest-first.
    async fn location_history(
        &self,
        query: LocationHistoryQuery,
    ) -> StoreResult<Vec<TrackingLocation>>;
    async fn delete_location(&self, id: i64) -> StoreResult<Option<TrackingLocation>>;

    // Aggregates — recomputed from source rows on every call
    async fn system_stats(&self) -> StoreResult<SystemStats>;
    async fn user_stats(&self, user_id: &str) -> StoreResult<UserStats>;
    async fn collector_stats(&self, collector_id: &str) -> StoreResult<CollectorStats>;
}
