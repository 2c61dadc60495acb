//! HTTP API
//!
//! Read-only JSON endpoints for seats and booking receipts, plus probes.

pub mod handlers;
pub mod routes;

pub use routes::create_router;
