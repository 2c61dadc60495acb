//! Infrastructure Layer
//!
//! Contains implementations for external concerns:
//! - Booking storage
//! - Prometheus metrics

pub mod metrics;
pub mod repositories;
