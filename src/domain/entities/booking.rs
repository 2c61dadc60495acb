//! Booking entity and repository trait.
//!
//! A booking is created exactly once, by the booking coordinator, when a
//! locked seat is confirmed. It is never mutated afterwards.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{BookingId, ClientId, SeatId};
use crate::shared::error::AppError;

/// Fare and schedule metadata attached to every booking of the trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDetails {
    pub train_number: String,
    pub departure: String,
    pub arrival: String,
    /// Fare in whole currency units.
    pub amount: u32,
    pub currency: String,
}

/// A confirmed, permanent seat assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: BookingId,
    pub seat_id: SeatId,
    pub client_id: ClientId,
    pub trip: TripDetails,
    pub booked_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(
        id: BookingId,
        seat_id: SeatId,
        client_id: ClientId,
        trip: TripDetails,
        booked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            seat_id,
            client_id,
            trip,
            booked_at,
        }
    }
}

/// Repository trait for booking records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Store a booking record. Fails if the id is already present.
    async fn insert(&self, booking: Booking) -> Result<(), AppError>;

    /// Find a booking by its reference.
    async fn find_by_id(&self, id: BookingId) -> Result<Option<Booking>, AppError>;

    /// All bookings made by a client identity, oldest first.
    async fn find_by_client(&self, client_id: &ClientId) -> Result<Vec<Booking>, AppError>;

    /// Drop a record whose seat transition never committed.
    async fn discard(&self, id: BookingId) -> Result<(), AppError>;
}
