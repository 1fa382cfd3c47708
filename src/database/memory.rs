//! In-memory store used by the integration test-suite and `--memory` mode.
//!
//! Mirrors the Postgres implementation's visible semantics: conditional
//! single-record mutations, list orderings, and uniqueness constraints.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use super::models::{
    CollectorStats, Donation, DonationChanges, DonationQuery, LocationHistoryQuery, NewDonation,
    NewPickup, NewRoute, NewRouteStop, NewTrackingLocation, NewUser, Pickup, PickupChanges,
    PickupQuery, Route, RouteChanges, RouteQuery, RouteStop, RouteStopChanges, Session,
    SystemStats, TrackingLocation, User, UserStats,
};
use super::models::stats::{co2_saved, round2};
use super::store::{Store, StoreError, StoreResult};
use crate::validation::ACCEPTED_DONATION_STATUSES;

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<BTreeMap<String, User>>,
    sessions: RwLock<BTreeMap<String, Session>>,
    pickups: RwLock<BTreeMap<i64, Pickup>>,
    donations: RwLock<BTreeMap<i64, Donation>>,
    routes: RwLock<BTreeMap<i64, Route>>,
    route_stops: RwLock<BTreeMap<i64, RouteStop>>,
    locations: RwLock<Vec<TrackingLocation>>,
    next_pickup_id: AtomicI64,
    next_donation_id: AtomicI64,
    next_route_id: AtomicI64,
    next_stop_id: AtomicI64,
    next_location_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_pickup_id: AtomicI64::new(1),
            next_donation_id: AtomicI64::new(1),
            next_route_id: AtomicI64::new(1),
            next_stop_id: AtomicI64::new(1),
            next_location_id: AtomicI64::new(1),
            ..Default::default()
        }
    }
}

fn page<T>(items: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

#[async_trait]
impl Store for MemoryStore {
    async fn health(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().unwrap();
        if users.values().any(|u| u.email == new.email) {
            return Err(StoreError::Conflict("users.email"));
        }
        let now = Utc::now();
        let user = User {
            id: new.id,
            email: new.email,
            email_verified: false,
            name: new.name,
            password_hash: new.password_hash,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.users.read().unwrap().get(id).cloned())
    }

    async fn create_session(&self, session: Session) -> StoreResult<Session> {
        self.sessions
            .write()
            .unwrap()
            .insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn session_by_id(&self, id: &str) -> StoreResult<Option<Session>> {
        Ok(self.sessions.read().unwrap().get(id).cloned())
    }

    async fn delete_session(&self, id: &str) -> StoreResult<bool> {
        Ok(self.sessions.write().unwrap().remove(id).is_some())
    }

    async fn insert_pickup(&self, new: NewPickup) -> StoreResult<Pickup> {
        let pickup = Pickup {
            id: self.next_pickup_id.fetch_add(1, Ordering::SeqCst),
            user_id: new.user_id,
            waste_type: new.waste_type,
            pickup_date: new.pickup_date,
            pickup_time: new.pickup_time,
            address: new.address,
            estimated_weight: new.estimated_weight,
            actual_weight: None,
            notes: new.notes,
            status: "pending".to_string(),
            collector_id: None,
            created_at: Utc::now(),
            completed_at: None,
        };
        self.pickups
            .write()
            .unwrap()
            .insert(pickup.id, pickup.clone());
        Ok(pickup)
    }

    async fn pickup_for_user(&self, id: i64, user_id: &str) -> StoreResult<Option<Pickup>> {
        let pickups = self.pickups.read().unwrap();
        Ok(pickups.get(&id).filter(|p| p.user_id == user_id).cloned())
    }

    async fn list_pickups(&self, query: PickupQuery) -> StoreResult<Vec<Pickup>> {
        let pickups = self.pickups.read().unwrap();
        let matches: Vec<Pickup> = pickups
            .values()
            .filter(|p| p.user_id == query.owner_id)
            .filter(|p| query.status.as_deref().is_none_or(|s| p.status == s))
            .filter(|p| query.user_id.as_deref().is_none_or(|u| p.user_id == u))
            .filter(|p| {
                query
                    .collector_id
                    .as_deref()
                    .is_none_or(|c| p.collector_id.as_deref() == Some(c))
            })
            .cloned()
            .collect();
        Ok(page(matches, query.limit, query.offset))
    }

    async fn update_pickup(
        &self,
        id: i64,
        user_id: &str,
        changes: PickupChanges,
    ) -> StoreResult<Option<Pickup>> {
        let mut pickups = self.pickups.write().unwrap();
        let Some(pickup) = pickups.get_mut(&id).filter(|p| p.user_id == user_id) else {
            return Ok(None);
        };
        if let Some(status) = changes.status {
            pickup.status = status;
        }
        if let Some(collector_id) = changes.collector_id {
            pickup.collector_id = collector_id;
        }
        if let Some(actual_weight) = changes.actual_weight {
            pickup.actual_weight = actual_weight;
        }
        if let Some(notes) = changes.notes {
            pickup.notes = notes;
        }
        if let Some(completed_at) = changes.completed_at {
            pickup.completed_at = completed_at;
        }
        Ok(Some(pickup.clone()))
    }

    async fn delete_pickup(&self, id: i64, user_id: &str) -> StoreResult<Option<Pickup>> {
        let mut pickups = self.pickups.write().unwrap();
        if pickups.get(&id).is_some_and(|p| p.user_id == user_id) {
            Ok(pickups.remove(&id))
        } else {
            Ok(None)
        }
    }

    async fn insert_donation(&self, new: NewDonation) -> StoreResult<Donation> {
        let now = Utc::now();
        let donation = Donation {
            id: self.next_donation_id.fetch_add(1, Ordering::SeqCst),
            user_id: new.user_id,
            ngo_id: new.ngo_id,
            item_type: new.item_type,
            item_name: new.item_name,
            condition: new.condition,
            quantity: new.quantity,
            description: new.description,
            pickup_address: new.pickup_address,
            contact_number: new.contact_number,
            status: "pending".to_string(),
            created_at: now,
            updated_at: now,
        };
        self.donations
            .write()
            .unwrap()
            .insert(donation.id, donation.clone());
        Ok(donation)
    }

    async fn donation_for_user(&self, id: i64, user_id: &str) -> StoreResult<Option<Donation>> {
        let donations = self.donations.read().unwrap();
        Ok(donations.get(&id).filter(|d| d.user_id == user_id).cloned())
    }

    async fn list_donations(&self, query: DonationQuery) -> StoreResult<Vec<Donation>> {
        let donations = self.donations.read().unwrap();
        let matches: Vec<Donation> = donations
            .values()
            .filter(|d| d.user_id == query.owner_id)
            .filter(|d| query.status.as_deref().is_none_or(|s| d.status == s))
            .filter(|d| query.user_id.as_deref().is_none_or(|u| d.user_id == u))
            .filter(|d| {
                query
                    .ngo_id
                    .as_deref()
                    .is_none_or(|n| d.ngo_id.as_deref() == Some(n))
            })
            .cloned()
            .collect();
        Ok(page(matches, query.limit, query.offset))
    }

    async fn update_donation(
        &self,
        id: i64,
        user_id: &str,
        changes: DonationChanges,
    ) -> StoreResult<Option<Donation>> {
        let mut donations = self.donations.write().unwrap();
        let Some(donation) = donations.get_mut(&id).filter(|d| d.user_id == user_id) else {
            return Ok(None);
        };
        if let Some(status) = changes.status {
            donation.status = status;
        }
        if let Some(ngo_id) = changes.ngo_id {
            donation.ngo_id = ngo_id;
        }
        donation.updated_at = Utc::now();
        Ok(Some(donation.clone()))
    }

    async fn delete_donation(&self, id: i64, user_id: &str) -> StoreResult<Option<Donation>> {
        let mut donations = self.donations.write().unwrap();
        if donations.get(&id).is_some_and(|d| d.user_id == user_id) {
            Ok(donations.remove(&id))
        } else {
            Ok(None)
        }
    }

    async fn insert_route(&self, new: NewRoute) -> StoreResult<Route> {
        let route = Route {
            id: self.next_route_id.fetch_add(1, Ordering::SeqCst),
            name: new.name,
            collector_id: new.collector_id,
            status: "planned".to_string(),
            total_distance: new.total_distance,
            total_pickups: new.total_pickups,
            start_time: None,
            end_time: None,
            created_at: Utc::now(),
        };
        self.routes.write().unwrap().insert(route.id, route.clone());
        Ok(route)
    }

    async fn route_by_id(&self, id: i64) -> StoreResult<Option<Route>> {
        Ok(self.routes.read().unwrap().get(&id).cloned())
    }

    async fn list_routes(&self, query: RouteQuery) -> StoreResult<Vec<Route>> {
        let routes = self.routes.read().unwrap();
        let mut matches: Vec<Route> = routes
            .values()
            .filter(|r| {
                query
                    .collector_id
                    .as_deref()
                    .is_none_or(|c| r.collector_id == c)
            })
            .filter(|r| query.status.as_deref().is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(page(matches, query.limit, query.offset))
    }

    async fn update_route(&self, id: i64, changes: RouteChanges) -> StoreResult<Option<Route>> {
        let mut routes = self.routes.write().unwrap();
        let Some(route) = routes.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(status) = changes.status {
            route.status = status;
        }
        if let Some(start_time) = changes.start_time {
            route.start_time = start_time;
        }
        if let Some(end_time) = changes.end_time {
            route.end_time = end_time;
        }
        Ok(Some(route.clone()))
    }

    async fn delete_route(&self, id: i64) -> StoreResult<Option<Route>> {
        Ok(self.routes.write().unwrap().remove(&id))
    }

    async fn insert_stop(&self, new: NewRouteStop) -> StoreResult<RouteStop> {
        let mut stops = self.route_stops.write().unwrap();
        if stops
            .values()
            .any(|s| s.route_id == new.route_id && s.stop_order == new.stop_order)
        {
            return Err(StoreError::Conflict("route_stops.stop_order"));
        }
        let stop = RouteStop {
            id: self.next_stop_id.fetch_add(1, Ordering::SeqCst),
            route_id: new.route_id,
            pickup_id: new.pickup_id,
            stop_order: new.stop_order,
            address: new.address,
            waste_type: new.waste_type,
            status: "pending".to_string(),
            arrival_time: None,
            departure_time: None,
        };
        stops.insert(stop.id, stop.clone());
        Ok(stop)
    }

    async fn stops_for_route(&self, route_id: i64) -> StoreResult<Vec<RouteStop>> {
        let stops = self.route_stops.read().unwrap();
        let mut matches: Vec<RouteStop> = stops
            .values()
            .filter(|s| s.route_id == route_id)
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.stop_order.cmp(&b.stop_order).then(a.id.cmp(&b.id)));
        Ok(matches)
    }

    async fn update_stop(
        &self,
        id: i64,
        changes: RouteStopChanges,
    ) -> StoreResult<Option<RouteStop>> {
        let mut stops = self.route_stops.write().unwrap();
        let Some(stop) = stops.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(status) = changes.status {
            stop.status = status;
        }
        if let Some(arrival_time) = changes.arrival_time {
            stop.arrival_time = arrival_time;
        }
        if let Some(departure_time) = changes.departure_time {
            stop.departure_time = departure_time;
        }
        Ok(Some(stop.clone()))
    }

    async fn insert_location(&self, new: NewTrackingLocation) -> StoreResult<TrackingLocation> {
        let location = TrackingLocation {
            id: self.next_location_id.fetch_add(1, Ordering::SeqCst),
            collector_id: new.collector_id,
            route_id: new.route_id,
            latitude: new.latitude,
            longitude: new.longitude,
            timestamp: Utc::now(),
            speed: new.speed,
        };
        self.locations.write().unwrap().push(location.clone());
        Ok(location)
    }

    async fn latest_location(&self, collector_id: &str) -> StoreResult<Option<TrackingLocation>> {
        let locations = self.locations.read().unwrap();
        Ok(locations
            .iter()
            .filter(|l| l.collector_id == collector_id)
            .max_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)))
            .cloned())
    }

    async fn location_history(
        &self,
        query: LocationHistoryQuery,
    ) -> StoreResult<Vec<TrackingLocation>> {
        let locations = self.locations.read().unwrap();
        let mut matches: Vec<TrackingLocation> = locations
            .iter()
            .filter(|l| l.collector_id == query.collector_id)
            .filter(|l| query.start_time.is_none_or(|t| l.timestamp >= t))
            .filter(|l| query.end_time.is_none_or(|t| l.timestamp <= t))
            .filter(|l| query.route_id.is_none_or(|r| l.route_id == Some(r)))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(page(matches, query.limit, query.offset))
    }

    async fn delete_location(&self, id: i64) -> StoreResult<Option<TrackingLocation>> {
        let mut locations = self.locations.write().unwrap();
        match locations.iter().position(|l| l.id == id) {
            Some(index) => Ok(Some(locations.remove(index))),
            None => Ok(None),
        }
    }

    async fn system_stats(&self) -> StoreResult<SystemStats> {
        let users = self.users.read().unwrap();
        let pickups = self.pickups.read().unwrap();
        let donations = self.donations.read().unwrap();

        let total_weight: f64 = pickups.values().filter_map(|p| p.actual_weight).sum();

        Ok(SystemStats {
            total_users: users.len() as i64,
            total_pickups: pickups.len() as i64,
            completed_pickups: pickups.values().filter(|p| p.status == "completed").count() as i64,
            pending_pickups: pickups.values().filter(|p| p.status == "pending").count() as i64,
            total_weight_recycled: round2(total_weight),
            total_donations: donations.len() as i64,
            pending_donations: donations.values().filter(|d| d.status == "pending").count() as i64,
            accepted_donations: donations
                .values()
                .filter(|d| ACCEPTED_DONATION_STATUSES.contains(&d.status.as_str()))
                .count() as i64,
        })
    }

    async fn user_stats(&self, user_id: &str) -> StoreResult<UserStats> {
        let pickups = self.pickups.read().unwrap();
        let donations = self.donations.read().unwrap();

        let owned: Vec<&Pickup> = pickups.values().filter(|p| p.user_id == user_id).collect();
        let total_weight: f64 = owned
            .iter()
            .filter(|p| p.status == "completed")
            .filter_map(|p| p.actual_weight)
            .sum();
        let total_weight = round2(total_weight);

        Ok(UserStats {
            total_pickups: owned.len() as i64,
            completed_pickups: owned.iter().filter(|p| p.status == "completed").count() as i64,
            total_weight_recycled: total_weight,
            co2_saved: co2_saved(total_weight),
            total_donations: donations.values().filter(|d| d.user_id == user_id).count() as i64,
            accepted_donations: donations
                .values()
                .filter(|d| d.user_id == user_id)
                .filter(|d| ACCEPTED_DONATION_STATUSES.contains(&d.status.as_str()))
                .count() as i64,
        })
    }

    async fn collector_stats(&self, collector_id: &str) -> StoreResult<CollectorStats> {
        let routes = self.routes.read().unwrap();
        let pickups = self.pickups.read().unwrap();

        let owned: Vec<&Route> = routes
            .values()
            .filter(|r| r.collector_id == collector_id)
            .collect();
        let distance: f64 = owned
            .iter()
            .filter(|r| r.status == "completed")
            .map(|r| r.total_distance)
            .sum();

        Ok(CollectorStats {
            routes_completed: owned.iter().filter(|r| r.status == "completed").count() as i64,
            active_routes: owned.iter().filter(|r| r.status == "active").count() as i64,
            total_routes: owned.len() as i64,
            pickups_completed: pickups
                .values()
                .filter(|p| p.collector_id.as_deref() == Some(collector_id))
                .filter(|p| p.status == "completed")
                .count() as i64,
            distance_traveled: round2(distance),
        })
    }
}
