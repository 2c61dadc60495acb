//! Health Check API Tests

use axum::http::StatusCode;

use crate::common::{client, seat, TestApp};

/// Test basic health check endpoint returns 200 OK
#[tokio::test]
async fn test_health_check_returns_ok() {
    let app = TestApp::new().await;

    let (status, json) = app.get_json("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}

/// Test liveness probe endpoint
#[tokio::test]
async fn test_liveness_probe() {
    let app = TestApp::new().await;

    let (status, json) = app.get_json("/health/live").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "alive");
}

/// Readiness reports seat tallies
#[tokio::test]
async fn test_readiness_probe_counts_seats() {
    let app = TestApp::new().await;
    app.state.locks.lock(&seat("C1-S1"), &client("x")).unwrap();

    let (status, json) = app.get_json("/health/ready").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["inventory"]["capacity"], 120);
    assert_eq!(json["checks"]["inventory"]["seats"]["locked"], 1);
    assert_eq!(json["checks"]["inventory"]["seats"]["available"], 119);
    assert_eq!(json["checks"]["websocket"]["active_connections"], 0);
}

/// Prometheus text exposition
#[tokio::test]
async fn test_metrics_endpoint() {
    let app = TestApp::new().await;
    app.state.locks.lock(&seat("C1-S1"), &client("x")).unwrap();

    let response = app.get("/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("train_booking_seat_transitions_total"));
}
