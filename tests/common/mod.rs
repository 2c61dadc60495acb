//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use train_booking::config::Settings;
use train_booking::domain::{ClientId, SeatId};
use train_booking::startup::{build_router, AppState};

/// Test application builder
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Default settings: 6 coaches x 20 seats, 300 s locks
    pub async fn new() -> Self {
        Self::with_settings(|builder| builder).await
    }

    /// Build with overrides on top of the defaults, e.g.
    /// `b.set_override("booking.lock_ttl_secs", 1)`.
    pub async fn with_settings<F>(configure: F) -> Self
    where
        F: FnOnce(
            config::ConfigBuilder<config::builder::DefaultState>,
        ) -> config::ConfigBuilder<config::builder::DefaultState>,
    {
        let builder = Settings::defaults("test".into()).expect("default settings");
        let settings: Settings = configure(builder)
            .build()
            .expect("build settings")
            .try_deserialize()
            .expect("deserialize settings");

        let state = AppState::new(settings);
        Self {
            router: build_router(state.clone()),
            state,
        }
    }

    /// Make a GET request to the application
    pub async fn get(&self, uri: &str) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    /// GET and decode the JSON body
    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let response = self.get(uri).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

pub fn seat(raw: &str) -> SeatId {
    raw.parse().unwrap()
}

pub fn client(raw: &str) -> ClientId {
    ClientId::new(raw).unwrap()
}
