//! # Domain Layer
//!
//! The domain layer contains the core seat reservation rules.
//! It is independent of the transport and of how bookings are stored.
//!
//! ## Structure
//!
//! - **entities**: Seat, SeatChanged, Booking
//! - **value_objects**: SeatId, ClientId, BookingId
//! - **services**: the Seat Registry and its compare-and-swap transition
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - All seat mutation goes through `SeatRegistry::try_transition`
//! - Repository and event-sink traits define the contracts with the outside

pub mod entities;
pub mod services;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use services::*;
pub use value_objects::*;
