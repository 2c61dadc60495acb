//! WebSocket Gateway
//!
//! Fans committed seat changes out to every connection and tracks which
//! connections belong to which client identity.
//!
//! The gateway is the registry's [`SeatEventSink`]. `publish` runs inside
//! the registry's critical section, so it only pushes onto the broadcast
//! channel and never calls back into the registry or the lock manager.

use std::collections::HashSet;
use std::time::Instant;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::config::WebSocketSettings;
use crate::domain::{ClientId, SeatChanged, SeatEventSink};
use crate::infrastructure::metrics;

/// Connected session bookkeeping
#[derive(Debug, Clone)]
pub struct ConnectedSession {
    pub client_id: Option<ClientId>,
    pub connected_at: Instant,
}

/// WebSocket gateway managing all connections
pub struct Gateway {
    /// Active sessions by session_id
    sessions: DashMap<String, ConnectedSession>,
    /// Client id to the sessions bound to it
    client_sessions: DashMap<ClientId, HashSet<String>>,
    /// Seat changes in commit order
    event_tx: broadcast::Sender<SeatChanged>,
    /// Heartbeat interval in milliseconds
    heartbeat_interval_ms: u64,
}

impl Gateway {
    pub fn new(settings: &WebSocketSettings) -> Self {
        let (event_tx, _) = broadcast::channel(settings.event_buffer.max(1));
        Self {
            sessions: DashMap::new(),
            client_sessions: DashMap::new(),
            event_tx,
            heartbeat_interval_ms: settings.heartbeat_interval_ms,
        }
    }

    /// Get the heartbeat interval
    pub fn heartbeat_interval(&self) -> u64 {
        self.heartbeat_interval_ms
    }

    /// Subscribe to seat changes committed from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SeatChanged> {
        self.event_tx.subscribe()
    }

    /// Register a new, not yet bound connection
    pub fn register_session(&self, session_id: &str) {
        self.sessions.insert(
            session_id.to_string(),
            ConnectedSession {
                client_id: None,
                connected_at: Instant::now(),
            },
        );
        metrics::set_websocket_connections(self.sessions.len());

        tracing::debug!(session_id = %session_id, "Session registered");
    }

    /// Record that `session_id` now speaks for `client`
    pub fn bind_client(&self, session_id: &str, client: &ClientId) {
        if let Some(mut session) = self.sessions.get_mut(session_id) {
            session.client_id = Some(client.clone());
        }
        self.client_sessions
            .entry(client.clone())
            .or_default()
            .insert(session_id.to_string());

        tracing::debug!(session_id = %session_id, client_id = %client, "Session bound to client");
    }

    /// Unregister a session.
    ///
    /// When it was the last connection bound to its client, `on_last` runs
    /// with that client id while the client's entry is still held, so a new
    /// connection for the same client cannot bind in between.
    pub fn unregister_session<F>(&self, session_id: &str, on_last: F)
    where
        F: FnOnce(&ClientId),
    {
        let Some((_, session)) = self.sessions.remove(session_id) else {
            return;
        };
        metrics::set_websocket_connections(self.sessions.len());

        let Some(client) = session.client_id else {
            tracing::debug!(session_id = %session_id, "Unbound session unregistered");
            return;
        };

        if let Entry::Occupied(mut entry) = self.client_sessions.entry(client) {
            entry.get_mut().remove(session_id);
            if entry.get().is_empty() {
                on_last(entry.key());
                entry.remove();
            }
        }

        tracing::debug!(
            session_id = %session_id,
            connected_ms = session.connected_at.elapsed().as_millis() as u64,
            "Session unregistered"
        );
    }

    /// Get session count
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of distinct client ids with a live connection
    pub fn client_count(&self) -> usize {
        self.client_sessions.len()
    }

    /// Check if a client has at least one live connection
    pub fn is_client_connected(&self, client: &ClientId) -> bool {
        self.client_sessions
            .get(client)
            .map(|sessions| !sessions.is_empty())
            .unwrap_or(false)
    }
}

impl SeatEventSink for Gateway {
    fn publish(&self, event: SeatChanged) {
        metrics::record_transition(event.previous, event.status);
        // no receivers just means nobody is connected
        let _ = self.event_tx.send(event);
    }
}
