//! Lock Service
//!
//! Grants, renews, releases and expires time-bounded seat locks.
//!
//! Every state change goes through [`SeatRegistry::try_transition`]. The
//! manager adds the per-client rule on top: a client holds at most one lock
//! at a time. A client's lock requests are serialized on that client's
//! holding entry, so two concurrent `lock` calls from the same client
//! cannot both succeed on different seats.
//!
//! The holding map is an index, not the source of truth. Expiry and
//! confirmation may leave it briefly stale; every use of it is checked
//! against the registry with a holder-scoped precondition.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::{
    ClientId, Precondition, RegistryError, Seat, SeatId, SeatRegistry, SeatState,
};
use crate::infrastructure::metrics;

/// Lock service errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LockError {
    #[error("Unknown seat: {0}")]
    UnknownSeat(SeatId),

    #[error("Seat {0} is not available")]
    SeatUnavailable(SeatId),
}

impl LockError {
    /// Stable code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownSeat(_) => "unknownSeat",
            Self::SeatUnavailable(_) => "seatUnavailable",
        }
    }
}

impl From<RegistryError> for LockError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownSeat(id) => LockError::UnknownSeat(id),
            RegistryError::Conflict(id) => LockError::SeatUnavailable(id),
            RegistryError::IllegalTransition { seat_id, .. } => LockError::SeatUnavailable(seat_id),
        }
    }
}

/// Result of a successful lock request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockGrant {
    pub seat_id: SeatId,
    pub expires_at: DateTime<Utc>,
    /// The request extended a lock the client already held.
    pub renewed: bool,
    /// A different seat the client held and gave up for this one.
    pub released: Option<SeatId>,
}

/// Lock manager.
pub struct LockManager {
    registry: Arc<SeatRegistry>,
    holdings: DashMap<ClientId, SeatId>,
    lock_ttl: Duration,
}

impl LockManager {
    pub fn new(registry: Arc<SeatRegistry>, lock_ttl: Duration) -> Self {
        Self {
            registry,
            holdings: DashMap::new(),
            lock_ttl,
        }
    }

    pub fn registry(&self) -> &Arc<SeatRegistry> {
        &self.registry
    }

    pub fn lock_ttl(&self) -> Duration {
        self.lock_ttl
    }

    /// Expiry of a lock taken at `now`, saturating at the end of time.
    fn expiry_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        chrono::Duration::from_std(self.lock_ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Lock `seat_id` for `client`, releasing any other seat it holds.
    pub fn lock(&self, seat_id: &SeatId, client: &ClientId) -> Result<LockGrant, LockError> {
        self.lock_at(seat_id, client, Utc::now())
    }

    /// [`lock`](Self::lock) evaluated at an explicit instant.
    pub fn lock_at(
        &self,
        seat_id: &SeatId,
        client: &ClientId,
        now: DateTime<Utc>,
    ) -> Result<LockGrant, LockError> {
        // reject unknown seats before touching the client's current lock
        self.registry.get(seat_id)?;

        // serializes this client's lock requests until the guard drops
        let entry = self.holdings.entry(client.clone());
        let previous = match &entry {
            Entry::Occupied(held) => Some(*held.get()),
            Entry::Vacant(_) => None,
        };

        let released = match previous {
            Some(held) if held != *seat_id && self.release(&held, client) => Some(held),
            _ => None,
        };

        match self.acquire(seat_id, client, now) {
            Ok(mut grant) => {
                grant.released = released;
                entry.insert(*seat_id);
                tracing::debug!(
                    seat_id = %seat_id,
                    client_id = %client,
                    expires_at = %grant.expires_at,
                    renewed = grant.renewed,
                    "Seat locked"
                );
                Ok(grant)
            }
            Err(e) => {
                if let Entry::Occupied(held) = entry {
                    held.remove();
                }
                metrics::record_rejection("lock", e.code());
                tracing::debug!(
                    seat_id = %seat_id,
                    client_id = %client,
                    error = %e,
                    "Lock rejected"
                );
                Err(e)
            }
        }
    }

    /// Take the lock from the registry, retrying once on a benign race.
    fn acquire(
        &self,
        seat_id: &SeatId,
        client: &ClientId,
        now: DateTime<Utc>,
    ) -> Result<LockGrant, LockError> {
        for attempt in 0..2 {
            let mut current = self.registry.get(seat_id)?;

            // a stale lock held by someone else is reclaimed on demand
            if current.state.is_expired_at(now) && current.holder() != Some(client) {
                self.reclaim(&current);
                current = self.registry.get(seat_id)?;
            }

            let (expected, renewed) = match &current.state {
                SeatState::Available => (Precondition::available(), false),
                SeatState::Locked { holder, .. } if holder == client => (
                    Precondition::locked_by(client).at_version(current.version),
                    true,
                ),
                _ => return Err(LockError::SeatUnavailable(*seat_id)),
            };

            let expires_at = self.expiry_from(now);
            let next = SeatState::Locked {
                holder: client.clone(),
                expires_at,
            };

            match self.registry.try_transition(seat_id, &expected, next) {
                Ok(_) => {
                    return Ok(LockGrant {
                        seat_id: *seat_id,
                        expires_at,
                        renewed,
                        released: None,
                    })
                }
                Err(RegistryError::Conflict(_)) => {
                    tracing::trace!(seat_id = %seat_id, attempt, "Lock raced, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(LockError::SeatUnavailable(*seat_id))
    }

    /// Release `seat_id` if `client` locks it. Returns whether it did.
    fn release(&self, seat_id: &SeatId, client: &ClientId) -> bool {
        match self.registry.try_transition(
            seat_id,
            &Precondition::locked_by(client),
            SeatState::Available,
        ) {
            Ok(_) => {
                tracing::debug!(seat_id = %seat_id, client_id = %client, "Seat unlocked");
                true
            }
            Err(RegistryError::Conflict(_)) => false,
            Err(e) => {
                tracing::warn!(seat_id = %seat_id, client_id = %client, error = %e, "Unlock failed");
                false
            }
        }
    }

    /// Release a lock held by `client`.
    ///
    /// Idempotent: returns `Ok(false)` when the seat is not locked by this
    /// client (already released, expired, booked, or someone else's).
    pub fn unlock(&self, seat_id: &SeatId, client: &ClientId) -> Result<bool, LockError> {
        self.registry.get(seat_id)?;

        let released = self.release(seat_id, client);
        if released {
            self.forget(client, seat_id);
        }
        Ok(released)
    }

    /// Release whatever lock `client` holds. Used on disconnect.
    pub fn release_client(&self, client: &ClientId) -> Option<SeatId> {
        // hold the entry so a concurrent lock by the same client waits
        let Entry::Occupied(held) = self.holdings.entry(client.clone()) else {
            return None;
        };
        let seat_id = *held.get();
        let released = self.release(&seat_id, client);
        held.remove();

        if released {
            tracing::info!(seat_id = %seat_id, client_id = %client, "Released lock of departed client");
            Some(seat_id)
        } else {
            None
        }
    }

    /// Seat currently locked by `client`, verified against the registry.
    pub fn held_by(&self, client: &ClientId) -> Option<SeatId> {
        let seat_id = *self.holdings.get(client)?.value();
        let seat = self.registry.get(&seat_id).ok()?;
        matches!(&seat.state, SeatState::Locked { holder, .. } if holder == client).then_some(seat_id)
    }

    /// Drop the holding index entry for `client` if it points at `seat_id`.
    pub(crate) fn forget(&self, client: &ClientId, seat_id: &SeatId) {
        self.holdings.remove_if(client, |_, held| held == seat_id);
    }

    /// Release every lock whose expiry is at or before `now`.
    ///
    /// Each release is a version-pinned compare-and-swap, so a lock that was
    /// renewed, unlocked or confirmed after the sweep read it is left alone.
    pub fn expire_sweep(&self, now: DateTime<Utc>) -> Vec<SeatId> {
        let mut released = Vec::new();

        for seat in self.registry.snapshot() {
            if !seat.state.is_expired_at(now) {
                continue;
            }
            if let Some(holder) = self.reclaim(&seat) {
                self.forget(&holder, &seat.id);
                released.push(seat.id);
            }
        }

        released
    }

    /// Expire the lock captured in `seat`. Returns the former holder.
    ///
    /// Must not touch the holding index: it runs inside `lock_at` while a
    /// holding entry guard is alive.
    fn reclaim(&self, seat: &Seat) -> Option<ClientId> {
        let holder = seat.holder()?.clone();
        let expected = Precondition::locked_by(&holder).at_version(seat.version);

        match self
            .registry
            .try_transition(&seat.id, &expected, SeatState::Available)
        {
            Ok(_) => {
                metrics::EXPIRED_LOCKS_TOTAL.inc();
                tracing::info!(seat_id = %seat.id, client_id = %holder, "Seat lock expired");
                Some(holder)
            }
            Err(_) => None,
        }
    }
}
