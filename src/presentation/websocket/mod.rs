//! WebSocket Gateway
//!
//! Real-time seat updates and lock/booking requests over WebSocket.

pub mod gateway;
pub mod handler;
pub mod messages;
pub mod session;

pub use gateway::Gateway;
pub use handler::ws_handler;
pub use messages::{ClientMessage, ServerMessage};
pub use session::SessionState;
