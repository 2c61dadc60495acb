//! End-to-end seat scenarios through the shared application state

use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use pretty_assertions::assert_eq;

use train_booking::application::services::{BookingError, LockError};
use train_booking::domain::{SeatState, SeatStatus};

use crate::common::{client, seat, TestApp};

fn status(app: &TestApp, raw: &str) -> SeatStatus {
    app.state.registry.get(&seat(raw)).unwrap().status()
}

/// X locks a seat, Y is turned away and nothing changes
#[tokio::test]
async fn test_second_client_cannot_lock() {
    let app = TestApp::new().await;
    let (x, y) = (client("x"), client("y"));

    app.state.locks.lock(&seat("C1-S1"), &x).unwrap();
    let before = app.state.registry.get(&seat("C1-S1")).unwrap();

    let result = app.state.locks.lock(&seat("C1-S1"), &y);

    assert_eq!(result, Err(LockError::SeatUnavailable(seat("C1-S1"))));
    assert_eq!(app.state.registry.get(&seat("C1-S1")).unwrap(), before);
    assert_eq!(app.state.locks.held_by(&y), None);
}

/// X locks and confirms; the receipt carries the trip metadata
#[tokio::test]
async fn test_lock_then_confirm() {
    let app = TestApp::new().await;
    let x = client("x");

    app.state.locks.lock(&seat("C1-S1"), &x).unwrap();
    let booking = app.state.bookings.confirm(&seat("C1-S1"), &x).await.unwrap();

    let current = app.state.registry.get(&seat("C1-S1")).unwrap();
    assert_eq!(
        current.state,
        SeatState::Booked {
            holder: x.clone(),
            booking_id: booking.id,
        }
    );

    let stored = app.state.bookings.get_booking(booking.id).await.unwrap();
    assert_eq!(stored, booking);
    assert_eq!(stored.trip.train_number, "T123");
    assert_eq!(stored.trip.amount, 50);
    assert_eq!(app.state.locks.held_by(&x), None);
}

/// X disconnects before confirming; its last connection going away frees the seat
#[tokio::test]
async fn test_disconnect_releases_lock() {
    let app = TestApp::new().await;
    let x = client("x");
    let gateway = &app.state.gateway;
    let locks = app.state.locks.clone();

    gateway.register_session("tab-1");
    gateway.register_session("tab-2");
    gateway.bind_client("tab-1", &x);
    gateway.bind_client("tab-2", &x);
    locks.lock(&seat("C1-S1"), &x).unwrap();

    gateway.unregister_session("tab-1", |c| {
        locks.release_client(c);
    });
    assert_eq!(status(&app, "C1-S1"), SeatStatus::Locked);

    gateway.unregister_session("tab-2", |c| {
        locks.release_client(c);
    });
    assert_eq!(status(&app, "C1-S1"), SeatStatus::Available);
    assert_eq!(locks.held_by(&x), None);
}

/// X switches from one seat to another and still holds exactly one
#[tokio::test]
async fn test_switching_seats() {
    let app = TestApp::new().await;
    let x = client("x");

    app.state.locks.lock(&seat("C1-S1"), &x).unwrap();
    let grant = app.state.locks.lock(&seat("C1-S2"), &x).unwrap();

    assert_eq!(grant.released, Some(seat("C1-S1")));
    assert_eq!(status(&app, "C1-S1"), SeatStatus::Available);
    assert_eq!(status(&app, "C1-S2"), SeatStatus::Locked);
    assert_eq!(app.state.locks.held_by(&x), Some(seat("C1-S2")));
    assert_eq!(app.state.registry.counts().locked, 1);
}

/// Unlocking twice is a no-op the second time
#[tokio::test]
async fn test_unlock_is_idempotent() {
    let app = TestApp::new().await;
    let x = client("x");

    app.state.locks.lock(&seat("C2-S3"), &x).unwrap();

    assert_eq!(app.state.locks.unlock(&seat("C2-S3"), &x), Ok(true));
    assert_eq!(app.state.locks.unlock(&seat("C2-S3"), &x), Ok(false));
    assert_eq!(status(&app, "C2-S3"), SeatStatus::Available);
}

/// A lock taken at t0 with TTL d is released at t0 + d and not before
#[tokio::test]
async fn test_expiry_boundary() {
    let app = TestApp::with_settings(|b| b.set_override("booking.lock_ttl_secs", 60).unwrap()).await;
    let x = client("x");
    let t0 = Utc::now();

    app.state.locks.lock_at(&seat("C1-S1"), &x, t0).unwrap();

    let early = t0 + ChronoDuration::seconds(60) - ChronoDuration::milliseconds(1);
    assert!(app.state.locks.expire_sweep(early).is_empty());
    assert_eq!(status(&app, "C1-S1"), SeatStatus::Locked);

    let due = t0 + ChronoDuration::seconds(60);
    assert_eq!(app.state.locks.expire_sweep(due), vec![seat("C1-S1")]);
    assert_eq!(status(&app, "C1-S1"), SeatStatus::Available);

    let late = app
        .state
        .bookings
        .confirm_at(&seat("C1-S1"), &x, due)
        .await;
    assert_eq!(late, Err(BookingError::LockLost(seat("C1-S1"))));
}

/// Seat updates reach gateway subscribers in commit order
#[tokio::test]
async fn test_updates_are_broadcast_in_order() {
    let app = TestApp::new().await;
    let mut rx = app.state.gateway.subscribe();
    let x = client("x");

    app.state.locks.lock(&seat("C1-S1"), &x).unwrap();
    app.state.locks.lock(&seat("C1-S2"), &x).unwrap();
    let booking = app.state.bookings.confirm(&seat("C1-S2"), &x).await.unwrap();

    let mut received = Vec::new();
    for _ in 0..4 {
        let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        received.push((event.sequence, event.seat_id.to_string(), event.status));
    }

    assert_eq!(
        received,
        vec![
            (1, "C1-S1".to_string(), SeatStatus::Locked),
            (2, "C1-S1".to_string(), SeatStatus::Available),
            (3, "C1-S2".to_string(), SeatStatus::Locked),
            (4, "C1-S2".to_string(), SeatStatus::Booked),
        ]
    );
    assert_eq!(
        app.state.registry.get(&seat("C1-S2")).unwrap().state.booking_id(),
        Some(booking.id)
    );
}
