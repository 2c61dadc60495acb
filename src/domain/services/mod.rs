//! Domain Services
//!
//! Business logic that does not belong to a single entity.

pub mod seat_registry;

pub use seat_registry::{
    Precondition, RegistryError, SeatCounts, SeatEventSink, SeatRegistry, VenueLayout,
};
