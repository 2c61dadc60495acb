//! WebSocket Connection Handler
//!
//! One task per connection. It sends `hello` with a seat snapshot, then
//! multiplexes three sources: client frames, committed seat changes and a
//! heartbeat check. Replies to lock/unlock/confirm go to the requester only.

use std::str::FromStr;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tokio::time::interval;
use uuid::Uuid;

use super::messages::{
    BookingConfirmed, ClientMessage, HelloPayload, LockGranted, RequestFailed, SeatRequest,
    SeatSnapshot, SeatUpdate, ServerMessage,
};
use super::session::{Binding, SessionState};
use crate::application::dto::{ReceiptView, SeatView};
use crate::application::services::BookingError;
use crate::domain::{ClientId, SeatId, SeatRegistry};
use crate::startup::AppState;

/// Grace period on top of the advertised heartbeat interval
const HEARTBEAT_GRACE: Duration = Duration::from_secs(10);

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let max_message_size = state.settings.websocket.max_message_size;
    let max_frame_size = state.settings.websocket.max_frame_size;

    ws.max_message_size(max_message_size)
        .max_frame_size(max_frame_size)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

/// Current seats plus the sequence they are at least as new as.
///
/// The sequence is read before the seats, so replaying every event with a
/// higher sequence can only repeat a change, never skip one.
fn snapshot(registry: &SeatRegistry) -> (Vec<SeatView>, u64) {
    let seq = registry.last_sequence();
    let seats = registry.snapshot().iter().map(SeatView::from).collect();
    (seats, seq)
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    // Split socket for concurrent read/write
    let (sender, receiver) = socket.split();
    serve_connection(sender, receiver, state).await;
}

/// Drive one connection over any frame sink and stream.
async fn serve_connection<W, R>(mut sender: W, mut receiver: R, state: AppState)
where
    W: Sink<Message> + Unpin + Send + 'static,
    R: Stream<Item = Result<Message, axum::Error>> + Unpin + Send,
{
    let session_id = Uuid::new_v4().to_string();
    let mut session = SessionState::new(session_id.clone());

    tracing::debug!(session_id = %session_id, "New WebSocket connection");

    // Create channel for outgoing messages
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Subscribe before the snapshot so no change falls in between
    let mut event_rx = state.gateway.subscribe();
    let (seats, mut floor) = snapshot(&state.registry);

    let heartbeat_interval_ms = state.gateway.heartbeat_interval();
    let hello = ServerMessage::Hello(HelloPayload {
        heartbeat_interval: heartbeat_interval_ms,
        lock_ttl_secs: state.locks.lock_ttl().as_secs(),
        seats,
        seq: floor,
    });
    if tx.send(hello).is_err() {
        return;
    }

    // Spawn task to forward messages from channel to WebSocket
    let sender_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    state.gateway.register_session(&session_id);

    let timeout = Duration::from_millis(heartbeat_interval_ms) + HEARTBEAT_GRACE;
    let mut heartbeat_check = interval(timeout);
    heartbeat_check.tick().await; // Skip first immediate tick

    // Main message loop
    loop {
        tokio::select! {
            // Handle incoming messages
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        session.heartbeat();
                        handle_message(text.as_str(), &mut session, &tx, &state).await;
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                        // Pong is handled automatically by axum
                        session.heartbeat();
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!(session_id = %session_id, "Connection closed");
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::debug!(session_id = %session_id, error = %e, "WebSocket error");
                        break;
                    }
                    Some(Ok(Message::Binary(_))) => {
                        let _ = tx.send(ServerMessage::RequestFailed(RequestFailed::bad_request(
                            "unknown",
                            None,
                            "binary frames are not supported",
                        )));
                    }
                }
            }

            // Forward committed seat changes
            event = event_rx.recv() => {
                match event {
                    Ok(change) => {
                        if change.sequence <= floor {
                            continue;
                        }
                        floor = change.sequence;
                        if tx.send(ServerMessage::SeatUpdate(SeatUpdate::from(&change))).is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(
                            session_id = %session_id,
                            skipped = n,
                            "Event receiver lagged, sending snapshot"
                        );
                        let (seats, seq) = snapshot(&state.registry);
                        floor = seq;
                        if tx.send(ServerMessage::SeatSnapshot(SeatSnapshot { seats, seq })).is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::error!("Gateway event channel closed");
                        break;
                    }
                }
            }

            // Check heartbeat timeout
            _ = heartbeat_check.tick() => {
                if !session.is_alive(timeout) {
                    tracing::info!(
                        session_id = %session_id,
                        "Heartbeat timeout, closing connection"
                    );
                    break;
                }
            }
        }
    }

    // Cleanup
    let locks = state.locks.clone();
    state.gateway.unregister_session(&session_id, |client| {
        if let Some(seat_id) = locks.release_client(client) {
            tracing::info!(
                client_id = %client,
                seat_id = %seat_id,
                "Released lock of disconnected client"
            );
        }
    });
    sender_task.abort();

    tracing::debug!(
        session_id = %session_id,
        client_id = ?session.client_id().map(ClientId::as_str),
        "WebSocket disconnected"
    );
}

/// Validate ids on a seat request and bind the connection to its client.
fn resolve(
    request_name: &str,
    request: &SeatRequest,
    session: &mut SessionState,
    state: &AppState,
) -> Result<(SeatId, ClientId), RequestFailed> {
    let echo = || Some(request.seat_id.clone());

    let client = ClientId::new(&request.client_id)
        .map_err(|e| RequestFailed::bad_request(request_name, echo(), e.to_string()))?;

    match session.bind(&client) {
        Binding::Bound => state.gateway.bind_client(&session.session_id, &client),
        Binding::Unchanged => {}
        Binding::Mismatch { bound } => {
            return Err(RequestFailed::new(
                request_name,
                echo(),
                "clientMismatch",
                format!("connection is bound to client '{}'", bound),
            ));
        }
    }

    let seat_id = SeatId::from_str(&request.seat_id)
        .map_err(|e| RequestFailed::bad_request(request_name, echo(), e.to_string()))?;

    Ok((seat_id, client))
}

/// Handle incoming WebSocket message
async fn handle_message(
    text: &str,
    session: &mut SessionState,
    tx: &mpsc::UnboundedSender<ServerMessage>,
    state: &AppState,
) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            let request = serde_json::from_str::<serde_json::Value>(text)
                .ok()
                .and_then(|v| v.get("event").and_then(|e| e.as_str()).map(str::to_owned))
                .unwrap_or_else(|| "unknown".to_owned());
            tracing::debug!(session_id = %session.session_id, error = %e, "Malformed message");
            let _ = tx.send(ServerMessage::RequestFailed(RequestFailed::bad_request(
                request,
                None,
                e.to_string(),
            )));
            return;
        }
    };

    let name = message.name();
    let request = match &message {
        ClientMessage::Heartbeat => {
            let _ = tx.send(ServerMessage::HeartbeatAck);
            tracing::trace!(session_id = %session.session_id, "Heartbeat received");
            return;
        }
        ClientMessage::LockSeat(request)
        | ClientMessage::UnlockSeat(request)
        | ClientMessage::ConfirmBooking(request) => request,
    };

    let (seat_id, client) = match resolve(name, request, session, state) {
        Ok(ids) => ids,
        Err(failed) => {
            let _ = tx.send(ServerMessage::RequestFailed(failed));
            return;
        }
    };

    let failed = |code: &str, message: String| {
        ServerMessage::RequestFailed(RequestFailed::new(
            name,
            Some(seat_id.to_string()),
            code,
            message,
        ))
    };

    let reply = match message {
        ClientMessage::LockSeat(_) => match state.locks.lock(&seat_id, &client) {
            Ok(grant) => Some(ServerMessage::LockGranted(LockGranted {
                seat_id: grant.seat_id,
                expires_at: grant.expires_at,
                renewed: grant.renewed,
            })),
            Err(e) => Some(failed(e.code(), e.to_string())),
        },
        ClientMessage::UnlockSeat(_) => match state.locks.unlock(&seat_id, &client) {
            Ok(_) => None,
            Err(e) => Some(failed(e.code(), e.to_string())),
        },
        ClientMessage::ConfirmBooking(_) => match state.bookings.confirm(&seat_id, &client).await {
            Ok(booking) => Some(ServerMessage::BookingConfirmed(BookingConfirmed {
                seat_id: booking.seat_id,
                booking_id: booking.id,
                booking: ReceiptView::from(&booking),
            })),
            Err(BookingError::Internal(e)) => {
                tracing::error!(seat_id = %seat_id, client_id = %client, error = %e, "Confirm failed");
                Some(failed("internal", "booking could not be recorded".into()))
            }
            Err(e) => Some(failed(e.code(), e.to_string())),
        },
        ClientMessage::Heartbeat => None,
    };

    if let Some(reply) = reply {
        let _ = tx.send(reply);
    }
}
