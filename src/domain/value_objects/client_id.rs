//! Client identities.
//!
//! A client identity is an opaque token generated by the browser for one
//! page session. It is not authenticated and is not guaranteed to survive a
//! reconnect; the server only requires it to be non-empty and reasonably
//! short.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Maximum accepted length of a client token, in bytes.
pub const MAX_CLIENT_ID_LEN: usize = 128;

/// Opaque client-generated session token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(Arc<str>);

/// Error returned for empty or oversized client tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientIdError {
    #[error("Client id must not be empty")]
    Empty,

    #[error("Client id exceeds {MAX_CLIENT_ID_LEN} bytes")]
    TooLong,
}

impl ClientId {
    /// Validate and wrap a client token.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ClientIdError> {
        let raw = raw.as_ref().trim();
        if raw.is_empty() {
            return Err(ClientIdError::Empty);
        }
        if raw.len() > MAX_CLIENT_ID_LEN {
            return Err(ClientIdError::TooLong);
        }
        Ok(Self(Arc::from(raw)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ClientId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ClientId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}
