mod common;

use axum_test::TestServer;
use serde_json::{json, Value};

async fn record(server: &TestServer, payload: Value) -> (u16, Value) {
    let res = server.post("/tracking").json(&payload).await;
    let status = res.status_code().as_u16();
    (status, res.json())
}

#[tokio::test]
async fn append_requires_collector_and_coordinates() {
    let server = common::test_server();

    let (status, body) = record(&server, json!({"latitude": 1.0, "longitude": 2.0})).await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "MISSING_COLLECTOR_ID");

    let (status, body) = record(&server, json!({"collectorId": "c1", "longitude": 2.0})).await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "MISSING_LATITUDE");

    let (status, body) = record(&server, json!({"collectorId": "c1", "latitude": 1.0})).await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "MISSING_LONGITUDE");
}

#[tokio::test]
async fn out_of_range_latitude_is_rejected_and_nothing_is_stored() {
    let server = common::test_server();

    let (status, body) = record(
        &server,
        json!({"collectorId": "c-reject", "latitude": 95, "longitude": 0}),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "INVALID_LATITUDE");

    let res = server
        .get("/tracking")
        .add_query_param("collector_id", "c-reject")
        .await;
    assert_eq!(res.status_code(), 404);
    let body: Value = res.json();
    assert_eq!(body["code"], "LOCATION_NOT_FOUND");
}

#[tokio::test]
async fn coordinate_bounds_are_inclusive() {
    let server = common::test_server();

    for (latitude, longitude) in [(90.0, 0.0), (-90.0, 0.0), (0.0, 180.0), (0.0, -180.0)] {
        let (status, _) = record(
            &server,
            json!({"collectorId": "c-edge", "latitude": latitude, "longitude": longitude}),
        )
        .await;
        assert_eq!(status, 201, "({}, {}) should be accepted", latitude, longitude);
    }

    let cases = [
        (90.0001, 0.0, "INVALID_LATITUDE"),
        (-90.0001, 0.0, "INVALID_LATITUDE"),
        (0.0, 180.0001, "INVALID_LONGITUDE"),
        (0.0, -180.0001, "INVALID_LONGITUDE"),
    ];
    for (latitude, longitude, expected_code) in cases {
        let (status, body) = record(
            &server,
            json!({"collectorId": "c-edge", "latitude": latitude, "longitude": longitude}),
        )
        .await;
        assert_eq!(status, 400, "({}, {})", latitude, longitude);
        assert_eq!(body["code"], expected_code);
    }
}

#[tokio::test]
async fn speed_bound_is_zero_to_three_hundred() {
    let server = common::test_server();

    let (status, _) = record(
        &server,
        json!({"collectorId": "c-speed", "latitude": 0, "longitude": 0, "speed": 0}),
    )
    .await;
    assert_eq!(status, 201);

    let (status, _) = record(
        &server,
        json!({"collectorId": "c-speed", "latitude": 0, "longitude": 0, "speed": 300}),
    )
    .await;
    assert_eq!(status, 201);

    for bad in [-1.0, 300.5] {
        let (status, body) = record(
            &server,
            json!({"collectorId": "c-speed", "latitude": 0, "longitude": 0, "speed": bad}),
        )
        .await;
        assert_eq!(status, 400, "speed {}", bad);
        assert_eq!(body["code"], "INVALID_SPEED");
    }
}

#[tokio::test]
async fn timestamps_are_server_assigned() {
    let server = common::test_server();

    let before = chrono::Utc::now();
    let (status, stored) = record(
        &server,
        json!({
            "collectorId": "c-ts",
            "latitude": 10.0,
            "longitude": 20.0,
            "timestamp": "1999-01-01T00:00:00Z",
        }),
    )
    .await;
    assert_eq!(status, 201);

    let ts: chrono::DateTime<chrono::Utc> =
        stored["timestamp"].as_str().unwrap().parse().unwrap();
    assert!(ts >= before, "client-supplied timestamp must be ignored");
}

#[tokio::test]
async fn current_location_is_the_latest_row() {
    let server = common::test_server();

    record(&server, json!({"collectorId": "c-cur", "latitude": 1.0, "longitude": 1.0})).await;
    record(&server, json!({"collectorId": "c-cur", "latitude": 2.0, "longitude": 2.0})).await;
    record(&server, json!({"collectorId": "c-other", "latitude": 9.0, "longitude": 9.0})).await;

    let res = server
        .get("/tracking")
        .add_query_param("collector_id", "c-cur")
        .await;
    assert_eq!(res.status_code(), 200);
    let current: Value = res.json();
    assert_eq!(current["latitude"], 2.0);
    assert_eq!(current["collectorId"], "c-cur");

    let res = server.get("/tracking").await;
    assert_eq!(res.status_code(), 400);
    let body: Value = res.json();
    assert_eq!(body["code"], "MISSING_COLLECTOR_ID");
}

#[tokio::test]
async fn history_is_newest_first_with_route_filter() {
    let server = common::test_server();

    record(&server, json!({"collectorId": "c-h", "latitude": 1.0, "longitude": 1.0, "routeId": 1})).await;
    record(&server, json!({"collectorId": "c-h", "latitude": 2.0, "longitude": 2.0, "routeId": 2})).await;
    record(&server, json!({"collectorId": "c-h", "latitude": 3.0, "longitude": 3.0, "routeId": 1})).await;

    let res = server
        .get("/tracking/history")
        .add_query_param("collector_id", "c-h")
        .await;
    assert_eq!(res.status_code(), 200);
    let all: Vec<Value> = res.json();
    assert_eq!(all.len(), 3);
    let latitudes: Vec<f64> = all.iter().map(|l| l["latitude"].as_f64().unwrap()).collect();
    assert_eq!(latitudes, vec![3.0, 2.0, 1.0]);

    let res = server
        .get("/tracking/history")
        .add_query_param("collector_id", "c-h")
        .add_query_param("route_id", "1")
        .await;
    let filtered: Vec<Value> = res.json();
    assert_eq!(filtered.len(), 2);

    let res = server.get("/tracking/history").await;
    assert_eq!(res.status_code(), 400);
    let body: Value = res.json();
    assert_eq!(body["code"], "MISSING_COLLECTOR_ID");
}

#[tokio::test]
async fn history_supports_a_time_window() {
    let server = common::test_server();

    record(&server, json!({"collectorId": "c-w", "latitude": 1.0, "longitude": 1.0})).await;
    let mid = chrono::Utc::now();
    record(&server, json!({"collectorId": "c-w", "latitude": 2.0, "longitude": 2.0})).await;

    let res = server
        .get("/tracking/history")
        .add_query_param("collector_id", "c-w")
        .add_query_param("start_time", mid.to_rfc3339())
        .await;
    assert_eq!(res.status_code(), 200);
    let recent: Vec<Value> = res.json();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0]["latitude"], 2.0);

    let res = server
        .get("/tracking/history")
        .add_query_param("collector_id", "c-w")
        .add_query_param("end_time", mid.to_rfc3339())
        .await;
    let earlier: Vec<Value> = res.json();
    assert_eq!(earlier.len(), 1);
    assert_eq!(earlier[0]["latitude"], 1.0);

    let res = server
        .get("/tracking/history")
        .add_query_param("collector_id", "c-w")
        .add_query_param("start_time", "lunchtime")
        .await;
    assert_eq!(res.status_code(), 400);
    let body: Value = res.json();
    assert_eq!(body["code"], "INVALID_START_TIME");
}

#[tokio::test]
async fn history_post_is_an_alias_for_append() {
    let server = common::test_server();

    let res = server
        .post("/tracking/history")
        .json(&json!({"collectorId": "c-alias", "latitude": 5.0, "longitude": 6.0}))
        .await;
    assert_eq!(res.status_code(), 201);
    let stored: Value = res.json();
    assert_eq!(stored["latitude"], 5.0);
}

#[tokio::test]
async fn history_delete_removes_a_single_record() {
    let server = common::test_server();

    let (_, stored) =
        record(&server, json!({"collectorId": "c-del", "latitude": 1.0, "longitude": 1.0})).await;
    let id = stored["id"].as_i64().unwrap();

    let res = server
        .delete("/tracking/history")
        .add_query_param("id", id.to_string())
        .await;
    assert_eq!(res.status_code(), 200);
    let body: Value = res.json();
    assert_eq!(body["message"], "Location record deleted successfully");
    assert_eq!(body["record"]["id"], id);

    let res = server
        .delete("/tracking/history")
        .add_query_param("id", id.to_string())
        .await;
    assert_eq!(res.status_code(), 404);
    let body: Value = res.json();
    assert_eq!(body["code"], "NOT_FOUND");
}
