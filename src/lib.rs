pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod validation;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware as axum_middleware,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use state::AppState;

/// Assemble the full router. Pickup/Donation/Route (and session) endpoints
/// sit behind the authentication gate; route-stops, tracking, and stats do
/// not enforce a caller identity.
pub fn app(state: AppState) -> Router {
    use handlers::{auth, donations, pickups, route_stops, routes, stats, tracking};

    let protected = Router::new()
        .route(
            "/pickups",
            get(pickups::get)
                .post(pickups::post)
                .put(pickups::put)
                .delete(pickups::delete),
        )
        .route(
            "/donations",
            get(donations::get)
                .post(donations::post)
                .put(donations::put)
                .delete(donations::delete),
        )
        .route(
            "/routes",
            get(routes::get)
                .post(routes::post)
                .put(routes::put)
                .delete(routes::delete),
        )
        .route("/auth/whoami", get(auth::whoami))
        .route("/auth/session", delete(auth::logout))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    let public = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route(
            "/route-stops",
            get(route_stops::get)
                .post(route_stops::post)
                .put(route_stops::put),
        )
        .route(
            "/tracking",
            get(tracking::current).post(tracking::record),
        )
        .route(
            "/tracking/history",
            get(tracking::history)
                .post(tracking::record)
                .delete(tracking::delete),
        )
        .route("/stats/system", get(stats::system))
        .route("/stats/user", get(stats::user))
        .route("/stats/collector", get(stats::collector));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    match config::config().environment {
        config::Environment::Development => CorsLayer::permissive(),
        _ => {
            let origins: Vec<HeaderValue> = config::config()
                .security
                .cors_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "EcoCollect API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Waste pickup and donation management REST API",
        "endpoints": {
            "auth": "/auth/register, /auth/login (public); /auth/whoami, /auth/session (bearer token)",
            "pickups": "/pickups (bearer token)",
            "donations": "/donations (bearer token)",
            "routes": "/routes (bearer token)",
            "route_stops": "/route-stops",
            "tracking": "/tracking, /tracking/history",
            "stats": "/stats/system, /stats/user, /stats/collector",
        },
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": "ok",
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "store_error": e.to_string(),
            })),
        ),
    }
}
