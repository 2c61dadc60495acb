//! Repository Implementations
//!
//! Concrete implementations of the repository traits defined in the
//! domain layer.
//!
//! ## Available Repositories
//!
//! - **InMemoryBookingRepository** - Confirmed booking records

pub mod booking_repository;

pub use booking_repository::InMemoryBookingRepository;
