//! Reconnecting WebSocket transport
//!
//! `core` holds the runtime-agnostic pieces (backoff math, pending-frame
//! queue); `session` owns the socket and the reconnect loop.

pub mod core;
pub mod session;

pub use core::{BackoffState, OutboundQueue, ReconnectPolicy};
pub use session::{spawn_session, FrameSender, SessionHandle, SessionParts, SocketEvent};
