//! REST API endpoint tests

mod booking_tests;
mod health_tests;
mod seat_tests;
