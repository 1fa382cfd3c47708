pub mod donation;
pub mod pickup;
pub mod route;
pub mod route_stop;
pub mod session;
pub mod stats;
pub mod tracking_location;
pub mod user;

pub use donation::{Donation, DonationChanges, DonationQuery, NewDonation};
pub use pickup::{NewPickup, Pickup, PickupChanges, PickupQuery};
pub use route::{NewRoute, Route, RouteChanges, RouteDetail, RouteQuery};
pub use route_stop::{NewRouteStop, RouteStop, RouteStopChanges};
pub use session::Session;
pub use stats::{CollectorStats, SystemStats, UserStats};
pub use tracking_location::{LocationHistoryQuery, NewTrackingLocation, TrackingLocation};
pub use user::{NewUser, User};
