//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - Committed seat transitions by previous and new status
//! - Rejected lock and booking requests by reason
//! - Confirmed bookings and reclaimed (expired) locks
//! - HTTP request counts and latency
//! - Active WebSocket connection gauge

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

use crate::domain::SeatStatus;

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Seat transitions committed by the registry, by `from` and `to` status
pub static SEAT_TRANSITIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("seat_transitions_total", "Committed seat state transitions")
            .namespace("train_booking"),
        &["from", "to"],
    )
    .expect("Failed to create SEAT_TRANSITIONS_TOTAL metric")
});

/// Lock and booking requests turned away, by error code
pub static REQUEST_REJECTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "request_rejections_total",
            "Lock and booking requests rejected, by reason",
        )
        .namespace("train_booking"),
        &["operation", "reason"],
    )
    .expect("Failed to create REQUEST_REJECTIONS_TOTAL metric")
});

/// Bookings created
pub static BOOKINGS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("bookings_total", "Bookings confirmed").namespace("train_booking"),
    )
    .expect("Failed to create BOOKINGS_TOTAL metric")
});

/// Locks reclaimed because their TTL ran out
pub static EXPIRED_LOCKS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("expired_locks_total", "Seat locks released by expiry")
            .namespace("train_booking"),
    )
    .expect("Failed to create EXPIRED_LOCKS_TOTAL metric")
});

/// HTTP request counter - tracks total requests by method, path, and status code
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests")
            .namespace("train_booking"),
        &["method", "path", "status"],
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric")
});

/// HTTP request latency histogram - tracks request duration in seconds
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
    HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        )
        .namespace("train_booking")
        .buckets(buckets),
        &["method", "path"],
    )
    .expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric")
});

/// Active WebSocket connections gauge
pub static WEBSOCKET_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new(
            "websocket_connections_active",
            "Number of active WebSocket connections",
        )
        .namespace("train_booking"),
    )
    .expect("Failed to create WEBSOCKET_CONNECTIONS_ACTIVE metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(SEAT_TRANSITIONS_TOTAL.clone()))
        .expect("Failed to register SEAT_TRANSITIONS_TOTAL");
    registry
        .register(Box::new(REQUEST_REJECTIONS_TOTAL.clone()))
        .expect("Failed to register REQUEST_REJECTIONS_TOTAL");
    registry
        .register(Box::new(BOOKINGS_TOTAL.clone()))
        .expect("Failed to register BOOKINGS_TOTAL");
    registry
        .register(Box::new(EXPIRED_LOCKS_TOTAL.clone()))
        .expect("Failed to register EXPIRED_LOCKS_TOTAL");
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("Failed to register HTTP_REQUESTS_TOTAL");
    registry
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");
    registry
        .register(Box::new(WEBSOCKET_CONNECTIONS_ACTIVE.clone()))
        .expect("Failed to register WEBSOCKET_CONNECTIONS_ACTIVE");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Helper to record a committed seat transition
pub fn record_transition(from: SeatStatus, to: SeatStatus) {
    SEAT_TRANSITIONS_TOTAL
        .with_label_values(&[from.as_str(), to.as_str()])
        .inc();
}

/// Helper to record a rejected lock/unlock/confirm request
pub fn record_rejection(operation: &str, reason: &str) {
    REQUEST_REJECTIONS_TOTAL
        .with_label_values(&[operation, reason])
        .inc();
}

/// Helper to record HTTP request metrics
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let status = status.to_string();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, status.as_str()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

/// Helper to update WebSocket connection count
pub fn set_websocket_connections(connected: usize) {
    WEBSOCKET_CONNECTIONS_ACTIVE.set(connected as i64);
}
