//! Seat Registry
//!
//! Authoritative state of every seat in the venue. The inventory is fixed at
//! construction time (coaches x seats per coach) and every seat sits behind
//! its own mutex, so transitions on different seats never contend.
//!
//! The only mutation primitive is [`SeatRegistry::try_transition`], a
//! compare-and-swap that applies a new state only when the current one
//! satisfies a [`Precondition`]. Higher-level operations (lock, unlock,
//! confirm, expiry) are all built from it.
//!
//! ## Event ordering
//!
//! Every committed transition is handed to the [`SeatEventSink`] while the
//! seat's mutex and the global sequencer are both held. Lock order is always
//! seat, then sequencer, so the sink observes events in commit order, per
//! seat and across the whole venue.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::domain::entities::{Seat, SeatChanged, SeatState, SeatStatus};
use crate::domain::value_objects::{ClientId, SeatId};

/// Receiver of committed seat transitions.
///
/// Implementations are called inside the registry's critical section and
/// must not block or call back into the registry.
pub trait SeatEventSink: Send + Sync {
    fn publish(&self, event: SeatChanged);
}

/// Dimensions of the fixed seat inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VenueLayout {
    pub coaches: u16,
    pub seats_per_coach: u16,
}

impl VenueLayout {
    pub fn new(coaches: u16, seats_per_coach: u16) -> Self {
        Self {
            coaches,
            seats_per_coach,
        }
    }

    /// Total number of seats.
    pub fn capacity(&self) -> usize {
        self.coaches as usize * self.seats_per_coach as usize
    }

    /// Position of a seat in coach-major order, if it is in the inventory.
    pub fn index_of(&self, id: &SeatId) -> Option<usize> {
        if id.coach() > self.coaches || id.seat() > self.seats_per_coach {
            return None;
        }
        Some((id.coach() as usize - 1) * self.seats_per_coach as usize + (id.seat() as usize - 1))
    }

    /// All seat ids in coach-major order.
    pub fn seat_ids(&self) -> impl Iterator<Item = SeatId> + '_ {
        (1..=self.coaches).flat_map(move |coach| {
            (1..=self.seats_per_coach).filter_map(move |seat| SeatId::new(coach, seat).ok())
        })
    }
}

/// Expected state for a compare-and-swap transition.
///
/// Status and holder are always compared. A version pins the exact
/// snapshot that was read; an expiry guard additionally requires a locked
/// seat to still be live at the given instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Precondition {
    status: SeatStatus,
    holder: Option<ClientId>,
    version: Option<u64>,
    unexpired_at: Option<DateTime<Utc>>,
}

impl Precondition {
    /// Seat must be available.
    pub fn available() -> Self {
        Self {
            status: SeatStatus::Available,
            holder: None,
            version: None,
            unexpired_at: None,
        }
    }

    /// Seat must be locked by `client`.
    pub fn locked_by(client: &ClientId) -> Self {
        Self {
            status: SeatStatus::Locked,
            holder: Some(client.clone()),
            version: None,
            unexpired_at: None,
        }
    }

    /// Seat must be booked by `client`.
    pub fn booked_by(client: &ClientId) -> Self {
        Self {
            status: SeatStatus::Booked,
            holder: Some(client.clone()),
            version: None,
            unexpired_at: None,
        }
    }

    /// Seat must still be at `version`.
    pub fn at_version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    /// A lock must not have expired at `now`.
    pub fn unexpired_at(mut self, now: DateTime<Utc>) -> Self {
        self.unexpired_at = Some(now);
        self
    }

    fn matches(&self, seat: &Seat) -> bool {
        if seat.status() != self.status || seat.holder() != self.holder.as_ref() {
            return false;
        }
        if self.version.is_some_and(|v| v != seat.version) {
            return false;
        }
        match self.unexpired_at {
            Some(now) => !seat.state.is_expired_at(now),
            None => true,
        }
    }
}

/// Seat registry errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Unknown seat: {0}")]
    UnknownSeat(SeatId),

    #[error("Seat {0} did not match the expected state")]
    Conflict(SeatId),

    #[error("Illegal transition on {seat_id}: {from} -> {to}")]
    IllegalTransition {
        seat_id: SeatId,
        from: SeatStatus,
        to: SeatStatus,
    },
}

/// Per-status seat tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SeatCounts {
    pub available: usize,
    pub locked: usize,
    pub booked: usize,
}

/// The single source of truth for seat state.
pub struct SeatRegistry {
    layout: VenueLayout,
    seats: Vec<Mutex<Seat>>,
    sequencer: Mutex<u64>,
    sink: Arc<dyn SeatEventSink>,
}

/// Whether the state machine allows `current -> next`.
///
/// Booked is terminal. A lock may only be renewed or booked by its own
/// holder; handing a seat to another client must go through Available.
fn is_legal(current: &SeatState, next: &SeatState) -> bool {
    match (current, next) {
        (SeatState::Available, SeatState::Locked { .. }) => true,
        (SeatState::Locked { .. }, SeatState::Available) => true,
        (SeatState::Locked { holder: a, .. }, SeatState::Locked { holder: b, .. }) => a == b,
        (SeatState::Locked { holder: a, .. }, SeatState::Booked { holder: b, .. }) => a == b,
        _ => false,
    }
}

impl SeatRegistry {
    /// Build the registry with every seat of `layout` available.
    pub fn new(layout: VenueLayout, sink: Arc<dyn SeatEventSink>) -> Self {
        let seats = layout
            .seat_ids()
            .map(|id| Mutex::new(Seat::available(id)))
            .collect();

        tracing::debug!(
            coaches = layout.coaches,
            seats_per_coach = layout.seats_per_coach,
            capacity = layout.capacity(),
            "Seat inventory initialized"
        );

        Self {
            layout,
            seats,
            sequencer: Mutex::new(0),
            sink,
        }
    }

    pub fn layout(&self) -> VenueLayout {
        self.layout
    }

    fn slot(&self, id: &SeatId) -> Result<&Mutex<Seat>, RegistryError> {
        self.layout
            .index_of(id)
            .and_then(|idx| self.seats.get(idx))
            .ok_or(RegistryError::UnknownSeat(*id))
    }

    /// Snapshot of a single seat.
    pub fn get(&self, id: &SeatId) -> Result<Seat, RegistryError> {
        Ok(self.slot(id)?.lock().clone())
    }

    /// Snapshot of every seat in coach-major order.
    ///
    /// Each seat is read atomically; the list as a whole is not a single
    /// instant, which is why clients reconcile with per-seat versions.
    pub fn snapshot(&self) -> Vec<Seat> {
        self.seats.iter().map(|slot| slot.lock().clone()).collect()
    }

    /// Sequence number of the most recently committed transition.
    pub fn last_sequence(&self) -> u64 {
        *self.sequencer.lock()
    }

    pub fn counts(&self) -> SeatCounts {
        self.seats
            .iter()
            .fold(SeatCounts::default(), |mut acc, slot| {
                match slot.lock().status() {
                    SeatStatus::Available => acc.available += 1,
                    SeatStatus::Locked => acc.locked += 1,
                    SeatStatus::Booked => acc.booked += 1,
                }
                acc
            })
    }

    /// Atomically replace the seat's state if it satisfies `expected`.
    ///
    /// On success the new snapshot is returned and exactly one
    /// [`SeatChanged`] is published. On failure the seat is untouched and
    /// nothing is published.
    pub fn try_transition(
        &self,
        id: &SeatId,
        expected: &Precondition,
        next: SeatState,
    ) -> Result<Seat, RegistryError> {
        let mut seat = self.slot(id)?.lock();

        if !expected.matches(&seat) {
            return Err(RegistryError::Conflict(*id));
        }

        if !is_legal(&seat.state, &next) {
            return Err(RegistryError::IllegalTransition {
                seat_id: *id,
                from: seat.status(),
                to: next.status(),
            });
        }

        let previous = seat.status();
        seat.state = next;
        seat.version += 1;
        let committed = seat.clone();

        let mut sequence = self.sequencer.lock();
        *sequence += 1;
        self.sink.publish(SeatChanged {
            sequence: *sequence,
            seat_id: *id,
            previous,
            status: committed.status(),
            holder: committed.holder().cloned(),
            booking_id: committed.state.booking_id(),
            version: committed.version,
            committed_at: Utc::now(),
        });

        Ok(committed)
    }
}

/// Sink that keeps every published event, for tests.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingSink {
    events: Mutex<Vec<SeatChanged>>,
}

#[cfg(test)]
impl RecordingSink {
    pub(crate) fn events(&self) -> Vec<SeatChanged> {
        self.events.lock().clone()
    }
}

#[cfg(test)]
impl SeatEventSink for RecordingSink {
    fn publish(&self, event: SeatChanged) {
        self.events.lock().push(event);
    }
}
