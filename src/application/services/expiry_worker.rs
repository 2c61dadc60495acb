//! Expiry Worker
//!
//! Background task that periodically reclaims locks whose TTL ran out.
//! Requests reclaim stale locks on demand too, so the worker only bounds
//! how long an abandoned seat keeps showing as locked to everyone else.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use super::lock_service::LockManager;

/// Spawn the sweep loop. It stops when `shutdown` flips to `true` or its
/// sender is dropped.
pub fn spawn_expiry_worker(
    locks: Arc<LockManager>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(interval_ms = every.as_millis() as u64, "Expiry worker started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let released = locks.expire_sweep(Utc::now());
                    if !released.is_empty() {
                        tracing::debug!(count = released.len(), "Expired locks reclaimed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Expiry worker stopped");
    })
}
