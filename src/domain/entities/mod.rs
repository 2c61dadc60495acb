//! # Domain Entities
//!
//! Core domain entities of the booking server.
//!
//! - **Seat**: one bookable seat, its lifecycle state and version
//! - **SeatChanged**: notification emitted for every committed transition
//! - **Booking**: a confirmed seat assignment with its trip metadata
//!
//! ## Repository Traits
//!
//! `BookingRepository` defines booking storage. It is implemented in the
//! infrastructure layer, following the dependency inversion principle.

mod booking;
mod seat;

pub use booking::{Booking, BookingRepository, TripDetails};
#[cfg(test)]
pub use booking::MockBookingRepository;
pub use seat::{Seat, SeatChanged, SeatState, SeatStatus};
