//! Snowflake ID Generator
//!
//! Twitter-style unique ID generation for booking references.
//!
//! ```text
//! 63                         22          17          12          0
//! +---------------------------+-----------+-----------+-----------+
//! |  ms since custom epoch    |  machine  |   node    |  sequence |
//! |          (41 bits)        |  (5 bits) |  (5 bits) |  (12 bits)|
//! +---------------------------+-----------+-----------+-----------+
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

/// Default epoch (2024-01-01T00:00:00.000Z)
pub const DEFAULT_EPOCH: u64 = 1704067200000;

const SEQUENCE_MASK: u64 = 0xFFF;

#[derive(Debug)]
struct Clock {
    last_timestamp: u64,
    sequence: u64,
}

/// Snowflake ID generator
///
/// Timestamp and sequence are advanced together under one lock, so two
/// concurrent callers can never observe the same (timestamp, sequence) pair.
#[derive(Debug)]
pub struct SnowflakeGenerator {
    epoch: u64,
    machine_id: u64,
    node_id: u64,
    clock: Mutex<Clock>,
}

impl SnowflakeGenerator {
    /// Create a new snowflake generator
    pub fn new(epoch: u64, machine_id: u64, node_id: u64) -> Self {
        Self {
            epoch,
            machine_id: machine_id & 0x1F, // 5 bits
            node_id: node_id & 0x1F,       // 5 bits
            clock: Mutex::new(Clock {
                last_timestamp: 0,
                sequence: 0,
            }),
        }
    }

    /// Generate a new snowflake ID
    pub fn generate(&self) -> i64 {
        let mut clock = self.clock.lock();

        // never step backwards, even if the wall clock does
        let mut timestamp = current_timestamp().max(clock.last_timestamp);

        if timestamp == clock.last_timestamp {
            clock.sequence = (clock.sequence + 1) & SEQUENCE_MASK;
            if clock.sequence == 0 {
                // sequence exhausted for this millisecond
                while timestamp <= clock.last_timestamp {
                    std::hint::spin_loop();
                    timestamp = current_timestamp();
                }
            }
        } else {
            clock.sequence = 0;
        }
        clock.last_timestamp = timestamp;

        let id = (timestamp.saturating_sub(self.epoch) << 22)
            | (self.machine_id << 17)
            | (self.node_id << 12)
            | clock.sequence;

        id as i64
    }

    /// Extract the wall-clock timestamp (ms since UNIX epoch) from an id.
    pub fn extract_timestamp(&self, snowflake: i64) -> u64 {
        ((snowflake as u64) >> 22) + self.epoch
    }
}

/// Get current timestamp in milliseconds
fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
