//! Booking Receipt API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use crate::common::{client, seat, TestApp};

#[tokio::test]
async fn test_get_booking_returns_receipt() {
    let app = TestApp::new().await;
    let x = client("x");
    app.state.locks.lock(&seat("C1-S1"), &x).unwrap();
    let booking = app.state.bookings.confirm(&seat("C1-S1"), &x).await.unwrap();

    let (status, json) = app
        .get_json(&format!("/api/v1/bookings/{}", booking.id))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["bookingId"], booking.id.to_string());
    assert_eq!(json["seatId"], "C1-S1");
    assert_eq!(json["trainNumber"], "T123");
    assert_eq!(json["departure"], "10:00 AM");
    assert_eq!(json["arrival"], "6:00 PM");
    assert_eq!(json["amount"], 50);
    assert_eq!(json["currency"], "USD");
}

#[tokio::test]
async fn test_get_unknown_booking() {
    let app = TestApp::new().await;

    let (status, json) = app.get_json("/api/v1/bookings/12345").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], 10001);
}

#[tokio::test]
async fn test_get_booking_with_malformed_id() {
    let app = TestApp::new().await;

    let (status, _) = app.get_json("/api/v1/bookings/not-a-number").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_client_bookings() {
    let app = TestApp::new().await;
    let x = client("x");

    for id in ["C1-S1", "C2-S2"] {
        app.state.locks.lock(&seat(id), &x).unwrap();
        app.state.bookings.confirm(&seat(id), &x).await.unwrap();
    }

    let (status, json) = app.get_json("/api/v1/clients/x/bookings").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["clientId"], "x");
    let seats: Vec<&str> = json["bookings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["seatId"].as_str().unwrap())
        .collect();
    assert_eq!(seats, vec!["C1-S1", "C2-S2"]);

    let (_, json) = app.get_json("/api/v1/clients/nobody/bookings").await;
    assert_eq!(json["bookings"].as_array().unwrap().len(), 0);
}
