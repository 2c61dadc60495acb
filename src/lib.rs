//! # Train Booking Library
//!
//! Seat reservation server for a fixed-capacity train:
//! - Per-seat compare-and-swap state machine (available, locked, booked)
//! - Time-bounded locks, at most one per client, reclaimed on expiry or
//!   disconnect
//! - Booking confirmation with snowflake booking references
//! - WebSocket gateway broadcasting seat changes in commit order
//! - RESTful HTTP endpoints for seats, receipts, health and metrics
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Seats, bookings, identifiers and the Seat Registry
//! - **Application Layer**: Lock manager, booking coordinator, expiry worker and DTOs
//! - **Infrastructure Layer**: Booking storage and Prometheus metrics
//! - **Presentation Layer**: HTTP handlers and WebSocket gateway
//!
//! ## Module Structure
//!
//! ```text
//! train_booking/
//! +-- config/         Configuration management
//! +-- domain/         Entities, value objects, Seat Registry
//! +-- application/    Lock and booking services, DTOs
//! +-- infrastructure/ Booking repository and metrics
//! +-- presentation/   HTTP routes and WebSocket handlers
//! +-- shared/         Common utilities (errors, snowflake IDs)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
