//! Concurrent workloads checked against the seat invariants.
//!
//! A checking sink replays every committed change in commit order and
//! records any state that breaks an invariant.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use train_booking::application::services::{BookingCoordinator, BookingError, LockError, LockManager};
use train_booking::domain::{
    BookingId, ClientId, SeatChanged, SeatEventSink, SeatId, SeatRegistry, SeatStatus,
    TripDetails, VenueLayout,
};
use train_booking::infrastructure::repositories::InMemoryBookingRepository;
use train_booking::shared::snowflake::{SnowflakeGenerator, DEFAULT_EPOCH};

use crate::common::client;

#[derive(Default)]
struct Model {
    last_sequence: u64,
    seats: HashMap<SeatId, SeatChanged>,
    booked: HashMap<SeatId, BookingId>,
    locks: HashMap<ClientId, SeatId>,
    violations: Vec<String>,
}

impl Model {
    fn apply(&mut self, event: SeatChanged) {
        if event.sequence != self.last_sequence + 1 {
            self.violations
                .push(format!("sequence {} after {}", event.sequence, self.last_sequence));
        }
        self.last_sequence = event.sequence;

        let previous = self.seats.get(&event.seat_id);
        let (prev_status, prev_holder, prev_version) = match previous {
            Some(p) => (p.status, p.holder.clone(), p.version),
            None => (SeatStatus::Available, None, 0),
        };

        if event.version != prev_version + 1 {
            self.violations
                .push(format!("{} version {} after {}", event.seat_id, event.version, prev_version));
        }
        if event.previous != prev_status {
            self.violations.push(format!("{} previous status mismatch", event.seat_id));
        }
        if prev_status == SeatStatus::Booked {
            self.violations.push(format!("{} left Booked", event.seat_id));
        }

        match event.status {
            SeatStatus::Booked => {
                if prev_status != SeatStatus::Locked || prev_holder != event.holder {
                    self.violations
                        .push(format!("{} booked without the holder's lock", event.seat_id));
                }
                if let Some(id) = event.booking_id {
                    if self.booked.insert(event.seat_id, id).is_some() {
                        self.violations.push(format!("{} booked twice", event.seat_id));
                    }
                }
            }
            SeatStatus::Locked => {
                if prev_status == SeatStatus::Locked && prev_holder != event.holder {
                    self.violations
                        .push(format!("{} changed holder while locked", event.seat_id));
                }
            }
            SeatStatus::Available => {}
        }

        if prev_status == SeatStatus::Locked {
            if let Some(holder) = &prev_holder {
                self.locks.remove(holder);
            }
        }
        if event.status == SeatStatus::Locked {
            if let Some(holder) = &event.holder {
                if let Some(other) = self.locks.insert(holder.clone(), event.seat_id) {
                    self.violations
                        .push(format!("{} holds {} and {}", holder, other, event.seat_id));
                }
            }
        }

        self.seats.insert(event.seat_id, event);
    }
}

#[derive(Default)]
struct CheckingSink {
    model: Mutex<Model>,
}

impl SeatEventSink for CheckingSink {
    fn publish(&self, event: SeatChanged) {
        self.model.lock().apply(event);
    }
}

struct Core {
    sink: Arc<CheckingSink>,
    locks: Arc<LockManager>,
    bookings: Arc<BookingCoordinator>,
}

fn core(coaches: u16, seats_per_coach: u16, ttl: Duration) -> Core {
    let sink = Arc::new(CheckingSink::default());
    let registry = Arc::new(SeatRegistry::new(
        VenueLayout::new(coaches, seats_per_coach),
        sink.clone(),
    ));
    let locks = Arc::new(LockManager::new(registry, ttl));
    let bookings = Arc::new(BookingCoordinator::new(
        locks.clone(),
        Arc::new(InMemoryBookingRepository::new()),
        Arc::new(SnowflakeGenerator::new(DEFAULT_EPOCH, 1, 0)),
        TripDetails {
            train_number: "T123".into(),
            departure: "10:00 AM".into(),
            arrival: "6:00 PM".into(),
            amount: 50,
            currency: "USD".into(),
        },
    ));
    Core {
        sink,
        locks,
        bookings,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_lock_has_single_winner() {
    let core = core(1, 1, Duration::from_secs(300));
    let target = SeatId::new(1, 1).unwrap();

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let locks = core.locks.clone();
            tokio::spawn(async move {
                let who = client(&format!("client-{}", i));
                (who.clone(), locks.lock(&target, &who))
            })
        })
        .collect();

    let mut winners = Vec::new();
    for handle in handles {
        let (who, result) = handle.await.unwrap();
        match result {
            Ok(_) => winners.push(who),
            Err(e) => assert_eq!(e, LockError::SeatUnavailable(target)),
        }
    }

    assert_eq!(winners.len(), 1);
    let seat = core.locks.registry().get(&target).unwrap();
    assert_eq!(seat.holder(), Some(&winners[0]));
    assert!(core.sink.model.lock().violations.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_confirms_create_one_booking() {
    let core = core(1, 2, Duration::from_secs(300));
    let target = SeatId::new(1, 1).unwrap();
    let owner = client("owner");
    core.locks.lock(&target, &owner).unwrap();

    let handles: Vec<_> = (0..24)
        .map(|i| {
            let bookings = core.bookings.clone();
            // every third request comes from an intruder
            let who = if i % 3 == 0 {
                client(&format!("intruder-{}", i))
            } else {
                owner.clone()
            };
            tokio::spawn(async move { (who.clone(), bookings.confirm(&target, &who).await) })
        })
        .collect();

    let mut references = Vec::new();
    for handle in handles {
        let (who, result) = handle.await.unwrap();
        if who == owner {
            references.push(result.unwrap().id);
        } else {
            assert!(matches!(
                result,
                Err(BookingError::LockLost(_)) | Err(BookingError::SeatUnavailable(_))
            ));
        }
    }

    references.dedup();
    assert_eq!(references.len(), 1);
    assert_eq!(core.bookings.bookings_for(&owner).await.unwrap().len(), 1);

    let model = core.sink.model.lock();
    assert!(model.violations.is_empty(), "{:?}", model.violations);
    assert_eq!(model.booked.get(&target), Some(&references[0]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_one_client_racing_itself_holds_one_seat() {
    let core = core(2, 4, Duration::from_secs(300));
    let who = client("x");

    let handles: Vec<_> = (0..8u16)
        .map(|i| {
            let locks = core.locks.clone();
            let who = who.clone();
            tokio::spawn(async move {
                let target = SeatId::new(i / 4 + 1, i % 4 + 1).unwrap();
                locks.lock(&target, &who)
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(core.locks.registry().counts().locked, 1);
    let model = core.sink.model.lock();
    assert!(model.violations.is_empty(), "{:?}", model.violations);
}

/// Mixed lock, unlock, confirm and expiry traffic over a small venue.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mixed_workload_preserves_invariants() {
    const SEATS: u16 = 6;
    const CLIENTS: usize = 12;
    const ROUNDS: usize = 300;

    let core = core(2, SEATS / 2, Duration::from_millis(2));

    let sweeper = {
        let locks = core.locks.clone();
        tokio::spawn(async move {
            for _ in 0..200 {
                locks.expire_sweep(Utc::now());
                tokio::task::yield_now().await;
            }
        })
    };

    let workers: Vec<_> = (0..CLIENTS)
        .map(|c| {
            let locks = core.locks.clone();
            let bookings = core.bookings.clone();
            tokio::spawn(async move {
                let who = client(&format!("client-{}", c));
                for round in 0..ROUNDS {
                    let n = (c * 7 + round * 13) as u16 % SEATS;
                    let target = SeatId::new(n / (SEATS / 2) + 1, n % (SEATS / 2) + 1).unwrap();
                    match (c + round) % 5 {
                        0 | 1 => {
                            let _ = locks.lock(&target, &who);
                        }
                        2 => {
                            let _ = locks.unlock(&target, &who);
                        }
                        3 => {
                            let _ = bookings.confirm(&target, &who).await;
                        }
                        _ => {
                            locks.release_client(&who);
                        }
                    }
                    if round % 16 == 0 {
                        tokio::task::yield_now().await;
                    }
                }
            })
        })
        .collect();

    for worker in workers {
        worker.await.unwrap();
    }
    sweeper.await.unwrap();

    let booked = {
        let model = core.sink.model.lock();
        assert!(model.violations.is_empty(), "{:?}", model.violations);
        model.booked.clone()
    };

    // every committed booking is retrievable and matches its seat
    for (seat_id, booking_id) in &booked {
        let booking = core.bookings.get_booking(*booking_id).await.unwrap();
        assert_eq!(&booking.seat_id, seat_id);
    }
}
