//! Seat API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{client, seat, TestApp};

#[tokio::test]
async fn test_list_seats_in_inventory_order() {
    let app = TestApp::with_settings(|b| {
        b.set_override("venue.coaches", 2)
            .unwrap()
            .set_override("venue.seats_per_coach", 2)
            .unwrap()
    })
    .await;

    let (status, json) = app.get_json("/api/v1/seats").await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = json["seats"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["seatId"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["C1-S1", "C1-S2", "C2-S1", "C2-S2"]);
    assert_eq!(json["counts"], json!({ "available": 4, "locked": 0, "booked": 0 }));
    assert_eq!(json["seq"], 0);
}

#[tokio::test]
async fn test_get_seat_reflects_lock() {
    let app = TestApp::new().await;
    app.state.locks.lock(&seat("C3-S7"), &client("x")).unwrap();

    let (status, json) = app.get_json("/api/v1/seats/C3-S7").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({ "seatId": "C3-S7", "status": "locked", "version": 1 })
    );
}

#[tokio::test]
async fn test_get_seat_malformed_id() {
    let app = TestApp::new().await;

    let (status, json) = app.get_json("/api/v1/seats/seat-1").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], 10002);
}

#[tokio::test]
async fn test_get_seat_outside_inventory() {
    let app = TestApp::new().await;

    let (status, _) = app.get_json("/api/v1/seats/C7-S1").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
