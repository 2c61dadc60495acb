//! Booking Service
//!
//! Turns a live seat lock into a permanent booking.
//!
//! The booking record is written before the seat transition commits, so a
//! client that sees the `booked` broadcast can fetch its receipt at once.
//! Lookups only return records whose seat is booked under that reference,
//! so a record whose commit loses a race is never visible before it is
//! discarded.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::services::lock_service::LockManager;
use crate::domain::{
    Booking, BookingId, BookingRepository, ClientId, Precondition, RegistryError, SeatId,
    SeatRegistry, SeatState, TripDetails,
};
use crate::infrastructure::metrics;
use crate::shared::snowflake::SnowflakeGenerator;

/// Booking service errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("Unknown seat: {0}")]
    UnknownSeat(SeatId),

    #[error("Seat {0} is booked by someone else")]
    SeatUnavailable(SeatId),

    #[error("No valid lock on seat {0}")]
    LockLost(SeatId),

    #[error("Booking not found: {0}")]
    NotFound(BookingId),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BookingError {
    /// Stable code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownSeat(_) => "unknownSeat",
            Self::SeatUnavailable(_) => "seatUnavailable",
            Self::LockLost(_) => "lockLost",
            Self::NotFound(_) => "notFound",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<RegistryError> for BookingError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownSeat(id) => BookingError::UnknownSeat(id),
            RegistryError::Conflict(id) => BookingError::LockLost(id),
            RegistryError::IllegalTransition { seat_id, .. } => BookingError::LockLost(seat_id),
        }
    }
}

/// Booking coordinator.
pub struct BookingCoordinator {
    locks: Arc<LockManager>,
    bookings: Arc<dyn BookingRepository>,
    ids: Arc<SnowflakeGenerator>,
    trip: TripDetails,
}

impl BookingCoordinator {
    pub fn new(
        locks: Arc<LockManager>,
        bookings: Arc<dyn BookingRepository>,
        ids: Arc<SnowflakeGenerator>,
        trip: TripDetails,
    ) -> Self {
        Self {
            locks,
            bookings,
            ids,
            trip,
        }
    }

    fn registry(&self) -> &SeatRegistry {
        self.locks.registry()
    }

    pub fn trip(&self) -> &TripDetails {
        &self.trip
    }

    /// Confirm the caller's lock on `seat_id` as a booking.
    ///
    /// The lock must still be live when the seat transition commits, not
    /// only when the request arrives.
    pub async fn confirm(&self, seat_id: &SeatId, client: &ClientId) -> Result<Booking, BookingError> {
        self.confirm_with_clock(seat_id, client, Utc::now).await
    }

    /// [`confirm`](Self::confirm) evaluated at an explicit instant.
    ///
    /// Repeating a confirm for a seat this client already booked returns the
    /// existing booking.
    pub async fn confirm_at(
        &self,
        seat_id: &SeatId,
        client: &ClientId,
        now: DateTime<Utc>,
    ) -> Result<Booking, BookingError> {
        self.confirm_with_clock(seat_id, client, move || now).await
    }

    async fn confirm_with_clock<C>(
        &self,
        seat_id: &SeatId,
        client: &ClientId,
        clock: C,
    ) -> Result<Booking, BookingError>
    where
        C: Fn() -> DateTime<Utc>,
    {
        let result = self.try_confirm(seat_id, client, clock).await;
        if let Err(e) = &result {
            metrics::record_rejection("confirm", e.code());
            tracing::debug!(seat_id = %seat_id, client_id = %client, error = %e, "Confirm rejected");
        }
        result
    }

    async fn try_confirm<C>(
        &self,
        seat_id: &SeatId,
        client: &ClientId,
        clock: C,
    ) -> Result<Booking, BookingError>
    where
        C: Fn() -> DateTime<Utc>,
    {
        for attempt in 0..2 {
            let now = clock();
            let current = self.registry().get(seat_id)?;

            match &current.state {
                SeatState::Booked { holder, booking_id } if holder == client => {
                    return self.get_booking(*booking_id).await;
                }
                SeatState::Booked { .. } => return Err(BookingError::SeatUnavailable(*seat_id)),
                _ if current.is_locked_by(client, now) => {}
                _ => return Err(BookingError::LockLost(*seat_id)),
            }

            let booking = Booking::new(
                BookingId::new(self.ids.generate()),
                *seat_id,
                client.clone(),
                self.trip.clone(),
                now,
            );
            self.bookings
                .insert(booking.clone())
                .await
                .map_err(|e| BookingError::Internal(e.to_string()))?;

            // the insert may have taken a while; expiry is judged at commit
            let expected = Precondition::locked_by(client)
                .at_version(current.version)
                .unexpired_at(clock());
            let next = SeatState::Booked {
                holder: client.clone(),
                booking_id: booking.id,
            };

            match self.registry().try_transition(seat_id, &expected, next) {
                Ok(_) => {
                    self.locks.forget(client, seat_id);
                    metrics::BOOKINGS_TOTAL.inc();
                    tracing::info!(
                        seat_id = %seat_id,
                        client_id = %client,
                        booking_id = %booking.id,
                        "Booking confirmed"
                    );
                    return Ok(booking);
                }
                Err(e) => {
                    self.discard(booking.id).await;
                    match e {
                        RegistryError::Conflict(_) => {
                            tracing::trace!(seat_id = %seat_id, attempt, "Confirm raced, retrying");
                        }
                        other => return Err(other.into()),
                    }
                }
            }
        }

        Err(BookingError::LockLost(*seat_id))
    }

    async fn discard(&self, id: BookingId) {
        if let Err(e) = self.bookings.discard(id).await {
            tracing::error!(booking_id = %id, error = %e, "Failed to discard uncommitted booking");
        }
    }

    /// Whether the seat is booked under this record's reference.
    fn is_committed(&self, booking: &Booking) -> bool {
        self.registry()
            .get(&booking.seat_id)
            .map(|seat| seat.state.booking_id() == Some(booking.id))
            .unwrap_or(false)
    }

    /// Look up a committed booking by reference.
    pub async fn get_booking(&self, id: BookingId) -> Result<Booking, BookingError> {
        self.bookings
            .find_by_id(id)
            .await
            .map_err(|e| BookingError::Internal(e.to_string()))?
            .filter(|booking| self.is_committed(booking))
            .ok_or(BookingError::NotFound(id))
    }

    /// All committed bookings made under a client identity.
    pub async fn bookings_for(&self, client: &ClientId) -> Result<Vec<Booking>, BookingError> {
        let mut bookings = self
            .bookings
            .find_by_client(client)
            .await
            .map_err(|e| BookingError::Internal(e.to_string()))?;
        bookings.retain(|booking| self.is_committed(booking));
        Ok(bookings)
    }
}
