//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.
//!
//! ## Value Objects
//!
//! - **SeatId**: `C<coach>-S<seat>` composite seat key
//! - **ClientId**: opaque client session token
//! - **BookingId**: snowflake booking reference

mod booking_id;
mod client_id;
mod seat_id;

pub use booking_id::*;
pub use client_id::*;
pub use seat_id::*;
