//! Infrastructure - concrete adapters behind the bridge's ports
//!
//! Endpoint resolution, durable storage, the WebSocket session, and the
//! message routing between them.

pub mod endpoint;
pub mod messaging;
pub mod storage;
pub mod websocket;
