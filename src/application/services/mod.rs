//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **LockManager**: seat locks, renewal, release and expiry
//! - **BookingCoordinator**: lock confirmation and booking lookup
//! - **expiry_worker**: periodic expiry sweep

pub mod booking_service;
pub mod expiry_worker;
pub mod lock_service;

// Re-export lock service types
pub use lock_service::{LockError, LockGrant, LockManager};

// Re-export booking service types
pub use booking_service::{BookingCoordinator, BookingError};

pub use expiry_worker::spawn_expiry_worker;
