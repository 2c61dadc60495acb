//! Response DTOs
//!
//! Data structures shared by the HTTP API and the gateway.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Booking, BookingId, Seat, SeatCounts, SeatId, SeatStatus};

/// Public view of one seat. Lock holders and expiry stay private.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatView {
    pub seat_id: SeatId,
    pub status: SeatStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<BookingId>,
    pub version: u64,
}

impl From<&Seat> for SeatView {
    fn from(seat: &Seat) -> Self {
        Self {
            seat_id: seat.id,
            status: seat.status(),
            booking_id: seat.state.booking_id(),
            version: seat.version,
        }
    }
}

/// Inventory listing
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatListResponse {
    pub seats: Vec<SeatView>,
    pub counts: SeatCounts,
    /// Sequence of the latest committed change when the listing was taken
    pub seq: u64,
}

/// Booking receipt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptView {
    pub booking_id: BookingId,
    pub seat_id: SeatId,
    pub train_number: String,
    pub departure: String,
    pub arrival: String,
    pub amount: u32,
    pub currency: String,
    pub booked_at: DateTime<Utc>,
}

impl From<&Booking> for ReceiptView {
    fn from(booking: &Booking) -> Self {
        Self {
            booking_id: booking.id,
            seat_id: booking.seat_id,
            train_number: booking.trip.train_number.clone(),
            departure: booking.trip.departure.clone(),
            arrival: booking.trip.arrival.clone(),
            amount: booking.trip.amount,
            currency: booking.trip.currency.clone(),
            booked_at: booking.booked_at,
        }
    }
}

impl From<Booking> for ReceiptView {
    fn from(booking: Booking) -> Self {
        Self::from(&booking)
    }
}

/// Bookings made by one client
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientBookingsResponse {
    pub client_id: String,
    pub bookings: Vec<ReceiptView>,
}
