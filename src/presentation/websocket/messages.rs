//! WebSocket Message Types
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`.
//! Payload-less events omit `data`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::dto::{ReceiptView, SeatView};
use crate::domain::{BookingId, SeatChanged, SeatId, SeatStatus};

/// Incoming client message
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    LockSeat(SeatRequest),
    UnlockSeat(SeatRequest),
    ConfirmBooking(SeatRequest),
    Heartbeat,
}

impl ClientMessage {
    /// Event name, echoed back in `requestFailed`.
    pub fn name(&self) -> &'static str {
        match self {
            ClientMessage::LockSeat(_) => "lockSeat",
            ClientMessage::UnlockSeat(_) => "unlockSeat",
            ClientMessage::ConfirmBooking(_) => "confirmBooking",
            ClientMessage::Heartbeat => "heartbeat",
        }
    }
}

/// Seat request payload. Fields stay raw so a malformed value can still be
/// echoed back to the sender.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatRequest {
    pub seat_id: String,
    pub client_id: String,
}

/// Outgoing server message
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    Hello(HelloPayload),
    SeatUpdate(SeatUpdate),
    SeatSnapshot(SeatSnapshot),
    LockGranted(LockGranted),
    BookingConfirmed(BookingConfirmed),
    RequestFailed(RequestFailed),
    HeartbeatAck,
}

/// First frame on every connection
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HelloPayload {
    pub heartbeat_interval: u64,
    pub lock_ttl_secs: u64,
    pub seats: Vec<SeatView>,
    pub seq: u64,
}

/// Broadcast seat change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatUpdate {
    pub seat_id: SeatId,
    pub status: SeatStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<BookingId>,
    pub version: u64,
    pub seq: u64,
}

impl From<&SeatChanged> for SeatUpdate {
    fn from(event: &SeatChanged) -> Self {
        Self {
            seat_id: event.seat_id,
            status: event.status,
            booking_id: event.booking_id,
            version: event.version,
            seq: event.sequence,
        }
    }
}

/// Full resync sent to a connection that fell behind
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatSnapshot {
    pub seats: Vec<SeatView>,
    pub seq: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockGranted {
    pub seat_id: SeatId,
    pub expires_at: DateTime<Utc>,
    pub renewed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmed {
    pub seat_id: SeatId,
    pub booking_id: BookingId,
    pub booking: ReceiptView,
}

/// Rejection sent only to the requester
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFailed {
    pub request: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat_id: Option<String>,
    pub code: String,
    pub message: String,
}

impl RequestFailed {
    pub fn new(
        request: impl Into<String>,
        seat_id: Option<String>,
        code: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            request: request.into(),
            seat_id,
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn bad_request(
        request: impl Into<String>,
        seat_id: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(request, seat_id, "badRequest", message)
    }
}
