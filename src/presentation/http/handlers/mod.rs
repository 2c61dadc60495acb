//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod bookings;
pub mod health;
pub mod seats;
