//! Common test utilities: a TestServer over the in-memory store plus
//! register/login helpers.

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum_test::TestServer;
use serde_json::{json, Value};

use ecocollect_api::database::MemoryStore;
use ecocollect_api::{app, AppState};

pub fn test_server() -> TestServer {
    let state = AppState::new(Arc::new(MemoryStore::new()));
    TestServer::new(app(state)).expect("failed to build test server")
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

/// Register a fresh account and log in, returning the bearer token.
pub async fn register_and_login(server: &TestServer, email: &str) -> TestUser {
    let res = server
        .post("/auth/register")
        .json(&json!({
            "email": email,
            "password": "correct-horse",
            "name": "Test User",
        }))
        .await;
    assert_eq!(res.status_code(), 201, "register failed: {}", res.text());
    let user: Value = res.json();

    let res = server
        .post("/auth/login")
        .json(&json!({
            "email": email,
            "password": "correct-horse",
        }))
        .await;
    assert_eq!(res.status_code(), 200, "login failed: {}", res.text());
    let body: Value = res.json();

    TestUser {
        id: user["id"].as_str().expect("user id").to_string(),
        email: email.to_string(),
        token: body["token"].as_str().expect("token").to_string(),
    }
}

pub fn bearer(token: &str) -> (header::HeaderName, HeaderValue) {
    (
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).expect("header value"),
    )
}

/// Create a pickup with sane defaults, returning the created record.
pub async fn create_pickup(server: &TestServer, user: &TestUser, weight: f64) -> Value {
    let (name, value) = bearer(&user.token);
    let res = server
        .post("/pickups")
        .add_header(name, value)
        .json(&json!({
            "wasteType": "plastic",
            "pickupDate": "2025-01-01",
            "pickupTime": "morning",
            "address": "1 Main St",
            "estimatedWeight": weight,
        }))
        .await;
    assert_eq!(res.status_code(), 201, "create pickup failed: {}", res.text());
    res.json()
}
