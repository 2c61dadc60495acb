//! Seat entity and its lifecycle states.
//!
//! A seat moves through a small state machine:
//!
//! ```text
//!              lock(c)                confirm(c)
//! Available ------------> Locked(c) ------------> Booked(c)
//!     ^                     |   ^                  (terminal)
//!     |   unlock(c)/expire  |   | renew(c)
//!     +---------------------+   +---+
//! ```
//!
//! The entity itself is plain data. Only the
//! [`SeatRegistry`](crate::domain::services::SeatRegistry) mutates it, and
//! only through its compare-and-swap transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{BookingId, ClientId, SeatId};

/// Coarse seat status as seen by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Available,
    Locked,
    Booked,
}

impl SeatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Locked => "locked",
            Self::Booked => "booked",
        }
    }
}

impl std::fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full seat state including holder data.
///
/// Holder, expiry and booking reference only exist in the variants where
/// they are meaningful, so an `Available` seat cannot carry a stale holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatState {
    Available,
    Locked {
        holder: ClientId,
        expires_at: DateTime<Utc>,
    },
    Booked {
        holder: ClientId,
        booking_id: BookingId,
    },
}

impl SeatState {
    pub fn status(&self) -> SeatStatus {
        match self {
            Self::Available => SeatStatus::Available,
            Self::Locked { .. } => SeatStatus::Locked,
            Self::Booked { .. } => SeatStatus::Booked,
        }
    }

    /// Client currently locking or having booked the seat.
    pub fn holder(&self) -> Option<&ClientId> {
        match self {
            Self::Available => None,
            Self::Locked { holder, .. } | Self::Booked { holder, .. } => Some(holder),
        }
    }

    /// Lock expiry, present only while locked.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Locked { expires_at, .. } => Some(*expires_at),
            _ => None,
        }
    }

    /// Booking reference, present only once booked.
    pub fn booking_id(&self) -> Option<BookingId> {
        match self {
            Self::Booked { booking_id, .. } => Some(*booking_id),
            _ => None,
        }
    }

    /// Whether this is a lock whose expiry is at or before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self, Self::Locked { expires_at, .. } if *expires_at <= now)
    }
}

/// Point-in-time snapshot of one seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    pub id: SeatId,
    pub state: SeatState,
    /// Number of transitions committed on this seat so far.
    pub version: u64,
}

impl Seat {
    /// A fresh, never-touched seat.
    pub fn available(id: SeatId) -> Self {
        Self {
            id,
            state: SeatState::Available,
            version: 0,
        }
    }

    pub fn status(&self) -> SeatStatus {
        self.state.status()
    }

    pub fn holder(&self) -> Option<&ClientId> {
        self.state.holder()
    }

    /// Whether `client` holds a lock on this seat that is still live at `now`.
    pub fn is_locked_by(&self, client: &ClientId, now: DateTime<Utc>) -> bool {
        match &self.state {
            SeatState::Locked { holder, expires_at } => holder == client && *expires_at > now,
            _ => false,
        }
    }
}

/// Seat-changed notification produced on every committed transition.
///
/// Events leave the registry in commit order; `sequence` is global across
/// all seats and `version` is per seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatChanged {
    pub sequence: u64,
    pub seat_id: SeatId,
    pub previous: SeatStatus,
    pub status: SeatStatus,
    /// Lock holder or booker after the change. Never broadcast.
    pub holder: Option<ClientId>,
    pub booking_id: Option<BookingId>,
    pub version: u64,
    pub committed_at: DateTime<Utc>,
}
