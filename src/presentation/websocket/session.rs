//! WebSocket Session Management

use std::time::Duration;

use tokio::time::Instant;

use crate::domain::ClientId;

/// Per-connection state owned by the connection task.
#[derive(Debug)]
pub struct SessionState {
    pub session_id: String,
    client_id: Option<ClientId>,
    last_heartbeat: Instant,
}

/// Outcome of presenting a client id on a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// First client id seen on this connection.
    Bound,
    /// Same client id as before.
    Unchanged,
    /// The connection already belongs to someone else.
    Mismatch { bound: ClientId },
}

impl SessionState {
    pub fn new(session_id: String) -> Self {
        Self {
            session_id,
            client_id: None,
            last_heartbeat: Instant::now(),
        }
    }

    pub fn client_id(&self) -> Option<&ClientId> {
        self.client_id.as_ref()
    }

    /// Tie the connection to `client`. Only the first client id sticks.
    pub fn bind(&mut self, client: &ClientId) -> Binding {
        match &self.client_id {
            None => {
                self.client_id = Some(client.clone());
                Binding::Bound
            }
            Some(bound) if bound == client => Binding::Unchanged,
            Some(bound) => Binding::Mismatch {
                bound: bound.clone(),
            },
        }
    }

    pub fn heartbeat(&mut self) {
        self.last_heartbeat = Instant::now();
    }

    pub fn is_alive(&self, timeout: Duration) -> bool {
        self.last_heartbeat.elapsed() < timeout
    }
}
