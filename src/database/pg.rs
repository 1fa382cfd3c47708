//! Postgres-backed store. All single-record mutations are one conditional
//! statement scoped to id (and owner where the entity is owner-scoped), with
//! `RETURNING *` standing in for a separate existence check.

use sqlx::{PgPool, QueryBuilder};

use super::manager::DatabaseManager;
use super::models::stats::{co2_saved, round2};
use super::models::{
    CollectorStats, Donation, DonationChanges, DonationQuery, LocationHistoryQuery, NewDonation,
    NewPickup, NewRoute, NewRouteStop, NewTrackingLocation, NewUser, Pickup, PickupChanges,
    PickupQuery, Route, RouteChanges, RouteQuery, RouteStop, RouteStopChanges, Session,
    SystemStats, TrackingLocation, User, UserStats,
};
use super::store::{Store, StoreError, StoreResult};
use crate::validation::ACCEPTED_DONATION_STATUSES;
use async_trait::async_trait;

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect using DATABASE_URL and bring the schema up to date.
    pub async fn connect() -> StoreResult<Self> {
        let store = Self::new(DatabaseManager::connect().await?);
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))
    }

    fn map_unique(err: sqlx::Error, constraint: &'static str) -> StoreError {
        match err
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation())
        {
            true => StoreError::Conflict(constraint),
            false => err.into(),
        }
    }

    fn accepted_statuses() -> Vec<String> {
        ACCEPTED_DONATION_STATUSES
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, name, password_hash) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&new.id)
        .bind(&new.email)
        .bind(&new.name)
        .bind(&new.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_unique(e, "users.email"))
    }

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_session(&self, session: Session) -> StoreResult<Session> {
        Ok(sqlx::query_as::<_, Session>(
            "INSERT INTO sessions (id, user_id, expires_at, ip_address, user_agent) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&session.id)
        .bind(&session.user_id)
        .bind(session.expires_at)
        .bind(&session.ip_address)
        .bind(&session.user_agent)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn session_by_id(&self, id: &str) -> StoreResult<Option<Session>> {
        Ok(
            sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn delete_session(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_pickup(&self, new: NewPickup) -> StoreResult<Pickup> {
        Ok(sqlx::query_as::<_, Pickup>(
            "INSERT INTO pickups \
             (user_id, waste_type, pickup_date, pickup_time, address, estimated_weight, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(&new.user_id)
        .bind(&new.waste_type)
        .bind(&new.pickup_date)
        .bind(&new.pickup_time)
        .bind(&new.address)
        .bind(new.estimated_weight)
        .bind(&new.notes)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn pickup_for_user(&self, id: i64, user_id: &str) -> StoreResult<Option<Pickup>> {
        Ok(
            sqlx::query_as::<_, Pickup>("SELECT * FROM pickups WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_pickups(&self, query: PickupQuery) -> StoreResult<Vec<Pickup>> {
        let mut qb = QueryBuilder::new("SELECT * FROM pickups WHERE user_id = ");
        qb.push_bind(query.owner_id);
        if let Some(status) = query.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(user_id) = query.user_id {
            qb.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(collector_id) = query.collector_id {
            qb.push(" AND collector_id = ").push_bind(collector_id);
        }
        qb.push(" LIMIT ").push_bind(query.limit);
        qb.push(" OFFSET ").push_bind(query.offset);
        Ok(qb.build_query_as::<Pickup>().fetch_all(&self.pool).await?)
    }

    async fn update_pickup(
        &self,
        id: i64,
        user_id: &str,
        changes: PickupChanges,
    ) -> StoreResult<Option<Pickup>> {
        if changes.is_empty() {
            return Err(StoreError::Query("no fields to update".to_string()));
        }
        let mut qb = QueryBuilder::new("UPDATE pickups SET ");
        let mut fields = qb.separated(", ");
        if let Some(status) = changes.status {
            fields.push("status = ").push_bind_unseparated(status);
        }
        if let Some(collector_id) = changes.collector_id {
            fields
                .push("collector_id = ")
                .push_bind_unseparated(collector_id);
        }
        if let Some(actual_weight) = changes.actual_weight {
            fields
                .push("actual_weight = ")
                .push_bind_unseparated(actual_weight);
        }
        if let Some(notes) = changes.notes {
            fields.push("notes = ").push_bind_unseparated(notes);
        }
        if let Some(completed_at) = changes.completed_at {
            fields
                .push("completed_at = ")
                .push_bind_unseparated(completed_at);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" AND user_id = ").push_bind(user_id);
        qb.push(" RETURNING *");
        Ok(qb
            .build_query_as::<Pickup>()
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_pickup(&self, id: i64, user_id: &str) -> StoreResult<Option<Pickup>> {
        Ok(sqlx::query_as::<_, Pickup>(
            "DELETE FROM pickups WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_donation(&self, new: NewDonation) -> StoreResult<Donation> {
        Ok(sqlx::query_as::<_, Donation>(
            "INSERT INTO donations \
             (user_id, ngo_id, item_type, item_name, condition, quantity, description, \
              pickup_address, contact_number) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(&new.user_id)
        .bind(&new.ngo_id)
        .bind(&new.item_type)
        .bind(&new.item_name)
        .bind(&new.condition)
        .bind(new.quantity)
        .bind(&new.description)
        .bind(&new.pickup_address)
        .bind(&new.contact_number)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn donation_for_user(&self, id: i64, user_id: &str) -> StoreResult<Option<Donation>> {
        Ok(
            sqlx::query_as::<_, Donation>("SELECT * FROM donations WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_donations(&self, query: DonationQuery) -> StoreResult<Vec<Donation>> {
        let mut qb = QueryBuilder::new("SELECT * FROM donations WHERE user_id = ");
        qb.push_bind(query.owner_id);
        if let Some(status) = query.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(user_id) = query.user_id {
            qb.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(ngo_id) = query.ngo_id {
            qb.push(" AND ngo_id = ").push_bind(ngo_id);
        }
        qb.push(" LIMIT ").push_bind(query.limit);
        qb.push(" OFFSET ").push_bind(query.offset);
        Ok(qb.build_query_as::<Donation>().fetch_all(&self.pool).await?)
    }

    async fn update_donation(
        &self,
        id: i64,
        user_id: &str,
        changes: DonationChanges,
    ) -> StoreResult<Option<Donation>> {
        // updated_at is bumped on every mutation, so SET is never empty here.
        let mut qb = QueryBuilder::new("UPDATE donations SET updated_at = now()");
        if let Some(status) = changes.status {
            qb.push(", status = ").push_bind(status);
        }
        if let Some(ngo_id) = changes.ngo_id {
            qb.push(", ngo_id = ").push_bind(ngo_id);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" AND user_id = ").push_bind(user_id);
        qb.push(" RETURNING *");
        Ok(qb
            .build_query_as::<Donation>()
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_donation(&self, id: i64, user_id: &str) -> StoreResult<Option<Donation>> {
        Ok(sqlx::query_as::<_, Donation>(
            "DELETE FROM donations WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_route(&self, new: NewRoute) -> StoreResult<Route> {
        Ok(sqlx::query_as::<_, Route>(
            "INSERT INTO routes (name, collector_id, total_distance, total_pickups) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&new.name)
        .bind(&new.collector_id)
        .bind(new.total_distance)
        .bind(new.total_pickups)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn route_by_id(&self, id: i64) -> StoreResult<Option<Route>> {
        Ok(
            sqlx::query_as::<_, Route>("SELECT * FROM routes WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_routes(&self, query: RouteQuery) -> StoreResult<Vec<Route>> {
        let mut qb = QueryBuilder::new("SELECT * FROM routes WHERE TRUE");
        if let Some(collector_id) = query.collector_id {
            qb.push(" AND collector_id = ").push_bind(collector_id);
        }
        if let Some(status) = query.status {
            qb.push(" AND status = ").push_bind(status);
        }
        qb.push(" ORDER BY created_at DESC, id DESC");
        qb.push(" LIMIT ").push_bind(query.limit);
        qb.push(" OFFSET ").push_bind(query.offset);
        Ok(qb.build_query_as::<Route>().fetch_all(&self.pool).await?)
    }

    async fn update_route(&self, id: i64, changes: RouteChanges) -> StoreResult<Option<Route>> {
        if changes.is_empty() {
            return Err(StoreError::Query("no fields to update".to_string()));
        }
        let mut qb = QueryBuilder::new("UPDATE routes SET ");
        let mut fields = qb.separated(", ");
        if let Some(status) = changes.status {
            fields.push("status = ").push_bind_unseparated(status);
        }
        if let Some(start_time) = changes.start_time {
            fields
                .push("start_time = ")
                .push_bind_unseparated(start_time);
        }
        if let Some(end_time) = changes.end_time {
            fields.push("end_time = ").push_bind_unseparated(end_time);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING *");
        Ok(qb
            .build_query_as::<Route>()
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_route(&self, id: i64) -> StoreResult<Option<Route>> {
        Ok(
            sqlx::query_as::<_, Route>("DELETE FROM routes WHERE id = $1 RETURNING *")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn insert_stop(&self, new: NewRouteStop) -> StoreResult<RouteStop> {
        sqlx::query_as::<_, RouteStop>(
            "INSERT INTO route_stops (route_id, pickup_id, stop_order, address, waste_type) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(new.route_id)
        .bind(new.pickup_id)
        .bind(new.stop_order)
        .bind(&new.address)
        .bind(&new.waste_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_unique(e, "route_stops.stop_order"))
    }

    async fn stops_for_route(&self, route_id: i64) -> StoreResult<Vec<RouteStop>> {
        Ok(sqlx::query_as::<_, RouteStop>(
            "SELECT * FROM route_stops WHERE route_id = $1 ORDER BY stop_order ASC, id ASC",
        )
        .bind(route_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_stop(
        &self,
        id: i64,
        changes: RouteStopChanges,
    ) -> StoreResult<Option<RouteStop>> {
        if changes.is_empty() {
            return Err(StoreError::Query("no fields to update".to_string()));
        }
        let mut qb = QueryBuilder::new("UPDATE route_stops SET ");
        let mut fields = qb.separated(", ");
        if let Some(status) = changes.status {
            fields.push("status = ").push_bind_unseparated(status);
        }
        if let Some(arrival_time) = changes.arrival_time {
            fields
                .push("arrival_time = ")
                .push_bind_unseparated(arrival_time);
        }
        if let Some(departure_time) = changes.departure_time {
            fields
                .push("departure_time = ")
                .push_bind_unseparated(departure_time);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING *");
        Ok(qb
            .build_query_as::<RouteStop>()
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_location(&self, new: NewTrackingLocation) -> StoreResult<TrackingLocation> {
        // timestamp comes from the database clock, never from the client
        Ok(sqlx::query_as::<_, TrackingLocation>(
            "INSERT INTO tracking_locations (collector_id, route_id, latitude, longitude, speed) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&new.collector_id)
        .bind(new.route_id)
        .bind(new.latitude)
        .bind(new.longitude)
        .bind(new.speed)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn latest_location(&self, collector_id: &str) -> StoreResult<Option<TrackingLocation>> {
        Ok(sqlx::query_as::<_, TrackingLocation>(
            "SELECT * FROM tracking_locations WHERE collector_id = $1 \
             ORDER BY timestamp DESC, id DESC LIMIT 1",
        )
        .bind(collector_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn location_history(
        &self,
        query: LocationHistoryQuery,
    ) -> StoreResult<Vec<TrackingLocation>> {
        let mut qb = QueryBuilder::new("SELECT * FROM tracking_locations WHERE collector_id = ");
        qb.push_bind(query.collector_id);
        if let Some(start_time) = query.start_time {
            qb.push(" AND timestamp >= ").push_bind(start_time);
        }
        if let Some(end_time) = query.end_time {
            qb.push(" AND timestamp <= ").push_bind(end_time);
        }
        if let Some(route_id) = query.route_id {
            qb.push(" AND route_id = ").push_bind(route_id);
        }
        qb.push(" ORDER BY timestamp DESC, id DESC");
        qb.push(" LIMIT ").push_bind(query.limit);
        qb.push(" OFFSET ").push_bind(query.offset);
        Ok(qb
            .build_query_as::<TrackingLocation>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn delete_location(&self, id: i64) -> StoreResult<Option<TrackingLocation>> {
        Ok(sqlx::query_as::<_, TrackingLocation>(
            "DELETE FROM tracking_locations WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn system_stats(&self) -> StoreResult<SystemStats> {
        // Independent read-only aggregates, dispatched concurrently.
        let total_users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool);
        let total_pickups =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pickups").fetch_one(&self.pool);
        let completed_pickups =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pickups WHERE status = 'completed'")
                .fetch_one(&self.pool);
        let pending_pickups =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pickups WHERE status = 'pending'")
                .fetch_one(&self.pool);
        let total_weight = sqlx::query_scalar::<_, f64>(
            "SELECT COALESCE(SUM(actual_weight), 0) FROM pickups",
        )
        .fetch_one(&self.pool);
        let total_donations =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM donations").fetch_one(&self.pool);
        let pending_donations = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM donations WHERE status = 'pending'",
        )
        .fetch_one(&self.pool);
        let accepted_donations = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM donations WHERE status = ANY($1)",
        )
        .bind(Self::accepted_statuses())
        .fetch_one(&self.pool);

        let (
            total_users,
            total_pickups,
            completed_pickups,
            pending_pickups,
            total_weight,
            total_donations,
            pending_donations,
            accepted_donations,
        ) = futures::try_join!(
            total_users,
            total_pickups,
            completed_pickups,
            pending_pickups,
            total_weight,
            total_donations,
            pending_donations,
            accepted_donations,
        )?;

        Ok(SystemStats {
            total_users,
            total_pickups,
            completed_pickups,
            pending_pickups,
            total_weight_recycled: round2(total_weight),
            total_donations,
            pending_donations,
            accepted_donations,
        })
    }

    async fn user_stats(&self, user_id: &str) -> StoreResult<UserStats> {
        let pickup_stats = sqlx::query_as::<_, (i64, i64, f64)>(
            "SELECT COUNT(*), \
                    COUNT(*) FILTER (WHERE status = 'completed'), \
                    COALESCE(SUM(actual_weight) \
                        FILTER (WHERE status = 'completed' AND actual_weight IS NOT NULL), 0) \
             FROM pickups WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool);

        let donation_stats = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE status = ANY($2)) \
             FROM donations WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(Self::accepted_statuses())
        .fetch_one(&self.pool);

        let ((total_pickups, completed_pickups, total_weight), (total_donations, accepted_donations)) =
            futures::try_join!(pickup_stats, donation_stats)?;

        let total_weight = round2(total_weight);
        Ok(UserStats {
            total_pickups,
            completed_pickups,
            total_weight_recycled: total_weight,
            co2_saved: co2_saved(total_weight),
            total_donations,
            accepted_donations,
        })
    }

    async fn collector_stats(&self, collector_id: &str) -> StoreResult<CollectorStats> {
        let route_stats = sqlx::query_as::<_, (i64, i64, i64, f64)>(
            "SELECT COUNT(*) FILTER (WHERE status = 'completed'), \
                    COUNT(*) FILTER (WHERE status = 'active'), \
                    COUNT(*), \
                    COALESCE(SUM(total_distance) FILTER (WHERE status = 'completed'), 0) \
             FROM routes WHERE collector_id = $1",
        )
        .bind(collector_id)
        .fetch_one(&self.pool);

        let pickups_completed = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM pickups WHERE collector_id = $1 AND status = 'completed'",
        )
        .bind(collector_id)
        .fetch_one(&self.pool);

        let ((routes_completed, active_routes, total_routes, distance), pickups_completed) =
            futures::try_join!(route_stats, pickups_completed)?;

        Ok(CollectorStats {
            routes_completed,
            active_routes,
            total_routes,
            pickups_completed,
            distance_traveled: round2(distance),
        })
    }
}
