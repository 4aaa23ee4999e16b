//! Message payloads exchanged over the WebSocket connection
//!
//! Payloads are opaque JSON values: their shape is defined entirely by the
//! UI application and the game server. The bridge serializes and routes them
//! without interpretation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Wire Payloads
// =============================================================================

/// A message from the UI application to the game server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutboundMessage(pub Value);

impl From<Value> for OutboundMessage {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// A message from the game server to the UI application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InboundMessage(pub Value);

impl From<Value> for InboundMessage {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// Classification of a reported failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Endpoint resolution could not split the hostname
    MalformedHostname,
    /// An inbound frame was not valid JSON
    InvalidFrame,
    /// A storage read or write failed
    PersistenceError,
    /// A connection-level failure
    TransportError,
}

/// Error report delivered to the UI application.
///
/// Failures never crash the routing loop; they surface here so the UI stays
/// usable after any single message or storage failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorDetails {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}
