//! Seat identifiers.
//!
//! A seat is addressed by its coach and its position inside that coach,
//! both 1-indexed. The textual form used on the wire is `C<coach>-S<seat>`:
//!
//! ```text
//! C3-S17
//! ^ ^ ^ ^
//! | | | +-- seat number (1..=seats_per_coach)
//! | | +---- literal "-S"
//! | +------ coach number (1..=coaches)
//! +-------- literal "C"
//! ```
//!
//! Whether a well-formed id actually exists is a question for the
//! [`SeatRegistry`](crate::domain::services::SeatRegistry), which knows the
//! configured inventory.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Composite seat key: (coach, seat).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeatId {
    coach: u16,
    seat: u16,
}

/// Error returned when a seat id string is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Malformed seat id '{0}', expected C<coach>-S<seat>")]
pub struct SeatIdError(pub String);

impl SeatId {
    /// Create a seat id from its parts. Both parts are 1-indexed.
    pub fn new(coach: u16, seat: u16) -> Result<Self, SeatIdError> {
        if coach == 0 || seat == 0 {
            return Err(SeatIdError(format!("C{}-S{}", coach, seat)));
        }
        Ok(Self { coach, seat })
    }

    /// Coach number.
    pub fn coach(&self) -> u16 {
        self.coach
    }

    /// Seat number within the coach.
    pub fn seat(&self) -> u16 {
        self.seat
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}-S{}", self.coach, self.seat)
    }
}

/// Parse a strictly decimal, unsigned, non-empty component.
fn parse_component(raw: &str) -> Option<u16> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

impl FromStr for SeatId {
    type Err = SeatIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || SeatIdError(s.to_string());

        let rest = s.strip_prefix('C').ok_or_else(malformed)?;
        let (coach, seat) = rest.split_once("-S").ok_or_else(malformed)?;
        let coach = parse_component(coach).ok_or_else(malformed)?;
        let seat = parse_component(seat).ok_or_else(malformed)?;

        Self::new(coach, seat).map_err(|_| malformed())
    }
}

impl Serialize for SeatId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SeatId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
