mod common;

use axum_test::TestServer;
use serde_json::{json, Value};

async fn complete_pickup(server: &TestServer, user: &common::TestUser, id: i64, weight: f64) {
    let (name, value) = common::bearer(&user.token);
    let res = server
        .put("/pickups")
        .add_query_param("id", id.to_string())
        .add_header(name, value)
        .json(&json!({"status": "completed", "actualWeight": weight}))
        .await;
    assert_eq!(res.status_code(), 200, "complete pickup failed: {}", res.text());
}

#[tokio::test]
async fn system_stats_start_at_zero() {
    let server = common::test_server();

    let res = server.get("/stats/system").await;
    assert_eq!(res.status_code(), 200);
    let stats: Value = res.json();
    assert_eq!(stats["totalUsers"], 0);
    assert_eq!(stats["totalPickups"], 0);
    assert_eq!(stats["completedPickups"], 0);
    assert_eq!(stats["pendingPickups"], 0);
    assert_eq!(stats["totalWeightRecycled"], 0.0);
    assert_eq!(stats["totalDonations"], 0);
    assert_eq!(stats["pendingDonations"], 0);
    assert_eq!(stats["acceptedDonations"], 0);
}

#[tokio::test]
async fn system_stats_count_across_all_users() {
    let server = common::test_server();
    let alice = common::register_and_login(&server, "sys-alice@example.com").await;
    let bob = common::register_and_login(&server, "sys-bob@example.com").await;

    let p1 = common::create_pickup(&server, &alice, 5.0).await;
    common::create_pickup(&server, &alice, 2.0).await;
    common::create_pickup(&server, &bob, 3.0).await;
    complete_pickup(&server, &alice, p1["id"].as_i64().unwrap(), 6.25).await;

    let (name, value) = common::bearer(&bob.token);
    let res = server
        .post("/donations")
        .add_header(name, value)
        .json(&json!({
            "itemType": "clothing",
            "itemName": "Winter coats",
            "condition": "good",
            "quantity": 4,
            "description": "Assorted sizes",
            "pickupAddress": "8 Birch Rd",
            "contactNumber": "+1-555-0102",
        }))
        .await;
    assert_eq!(res.status_code(), 201);

    let res = server.get("/stats/system").await;
    let stats: Value = res.json();
    assert_eq!(stats["totalUsers"], 2);
    assert_eq!(stats["totalPickups"], 3);
    assert_eq!(stats["completedPickups"], 1);
    assert_eq!(stats["pendingPickups"], 2);
    assert_eq!(stats["totalWeightRecycled"], 6.25);
    assert_eq!(stats["totalDonations"], 1);
    assert_eq!(stats["pendingDonations"], 1);
    assert_eq!(stats["acceptedDonations"], 0);
}

#[tokio::test]
async fn user_stats_apply_the_co2_multiplier() {
    let server = common::test_server();
    let user = common::register_and_login(&server, "impact@example.com").await;

    let p1 = common::create_pickup(&server, &user, 9.0).await;
    let p2 = common::create_pickup(&server, &user, 11.0).await;
    common::create_pickup(&server, &user, 1.0).await;

    complete_pickup(&server, &user, p1["id"].as_i64().unwrap(), 10.0).await;
    complete_pickup(&server, &user, p2["id"].as_i64().unwrap(), 12.5).await;

    let res = server
        .get("/stats/user")
        .add_query_param("user_id", &user.id)
        .await;
    assert_eq!(res.status_code(), 200);
    let stats: Value = res.json();
    assert_eq!(stats["totalPickups"], 3);
    assert_eq!(stats["completedPickups"], 2);
    assert_eq!(stats["totalWeightRecycled"], 22.5);
    assert_eq!(stats["co2Saved"], 56.25);
    assert_eq!(stats["totalDonations"], 0);
    assert_eq!(stats["acceptedDonations"], 0);
}

#[tokio::test]
async fn user_stats_ignore_incomplete_weights() {
    let server = common::test_server();
    let user = common::register_and_login(&server, "partial@example.com").await;

    // Assigned but not completed: actualWeight set, must not count
    let pickup = common::create_pickup(&server, &user, 5.0).await;
    let (name, value) = common::bearer(&user.token);
    let res = server
        .put("/pickups")
        .add_query_param("id", pickup["id"].as_i64().unwrap().to_string())
        .add_header(name, value)
        .json(&json!({"status": "in-progress", "actualWeight": 99.0}))
        .await;
    assert_eq!(res.status_code(), 200);

    let res = server
        .get("/stats/user")
        .add_query_param("user_id", &user.id)
        .await;
    let stats: Value = res.json();
    assert_eq!(stats["totalWeightRecycled"], 0.0);
    assert_eq!(stats["co2Saved"], 0.0);
}

#[tokio::test]
async fn user_stats_require_user_id() {
    let server = common::test_server();

    let res = server.get("/stats/user").await;
    assert_eq!(res.status_code(), 400);
    let body: Value = res.json();
    assert_eq!(body["code"], "MISSING_USER_ID");
}

#[tokio::test]
async fn accepted_donations_span_the_accepted_lifecycle() {
    let server = common::test_server();
    let user = common::register_and_login(&server, "lifecycle@example.com").await;

    let mut ids = Vec::new();
    for _ in 0..4 {
        let (name, value) = common::bearer(&user.token);
        let res = server
            .post("/donations")
            .add_header(name, value)
            .json(&json!({
                "itemType": "toys",
                "itemName": "Blocks",
                "condition": "excellent",
                "quantity": 2,
                "description": "Building blocks",
                "pickupAddress": "1 Toy Ln",
                "contactNumber": "+1-555-0103",
            }))
            .await;
        let donation: Value = res.json();
        ids.push(donation["id"].as_i64().unwrap());
    }

    for (id, status) in ids.iter().zip(["accepted", "picked-up", "delivered", "rejected"]) {
        let (name, value) = common::bearer(&user.token);
        let res = server
            .put("/donations")
            .add_query_param("id", id.to_string())
            .add_header(name, value)
            .json(&json!({ "status": status }))
            .await;
        assert_eq!(res.status_code(), 200);
    }

    let res = server
        .get("/stats/user")
        .add_query_param("user_id", &user.id)
        .await;
    let stats: Value = res.json();
    assert_eq!(stats["totalDonations"], 4);
    assert_eq!(stats["acceptedDonations"], 3);
}

#[tokio::test]
async fn collector_stats_aggregate_routes_and_pickups() {
    let server = common::test_server();
    let user = common::register_and_login(&server, "fleet@example.com").await;

    let mut route_ids = Vec::new();
    for (name_suffix, distance) in [("done", 10.5), ("active", 5.0), ("planned", 3.0)] {
        let (name, value) = common::bearer(&user.token);
        let res = server
            .post("/routes")
            .add_header(name, value)
            .json(&json!({
                "name": format!("Route {}", name_suffix),
                "collectorId": "collector-42",
                "totalDistance": distance,
                "totalPickups": 2,
            }))
            .await;
        let route: Value = res.json();
        route_ids.push(route["id"].as_i64().unwrap());
    }

    for (id, status) in route_ids.iter().zip(["completed", "active"]) {
        let (name, value) = common::bearer(&user.token);
        let res = server
            .put("/routes")
            .add_query_param("id", id.to_string())
            .add_header(name, value)
            .json(&json!({ "status": status }))
            .await;
        assert_eq!(res.status_code(), 200);
    }

    // One completed pickup assigned to this collector
    let pickup = common::create_pickup(&server, &user, 5.0).await;
    let (name, value) = common::bearer(&user.token);
    let res = server
        .put("/pickups")
        .add_query_param("id", pickup["id"].as_i64().unwrap().to_string())
        .add_header(name, value)
        .json(&json!({"status": "completed", "collectorId": "collector-42", "actualWeight": 5.5}))
        .await;
    assert_eq!(res.status_code(), 200);

    let res = server
        .get("/stats/collector")
        .add_query_param("collector_id", "collector-42")
        .await;
    assert_eq!(res.status_code(), 200);
    let stats: Value = res.json();
    assert_eq!(stats["routesCompleted"], 1);
    assert_eq!(stats["activeRoutes"], 1);
    assert_eq!(stats["totalRoutes"], 3);
    assert_eq!(stats["pickupsCompleted"], 1);
    assert_eq!(stats["distanceTraveled"], 10.5);

    let res = server.get("/stats/collector").await;
    assert_eq!(res.status_code(), 400);
    let body: Value = res.json();
    assert_eq!(body["code"], "MISSING_COLLECTOR_ID");
}
