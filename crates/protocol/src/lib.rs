//! Hearth Protocol - shared types crossing the UI application boundary
//!
//! This crate contains the data shapes exchanged between the UI application,
//! the game server, and the local game library:
//! - Opaque wire-format message payloads (`OutboundMessage`, `InboundMessage`)
//! - Saved-game library records (`SavedGame`, `GameLibrary`)
//! - Error report payloads (`ErrorDetails`)
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde and serde_json
//! 2. **No business logic** - Pure data types and serialization
//! 3. **Opaque payloads** - Message shapes belong to the UI application and
//!    the server; this crate never interprets them

pub mod library;
pub mod messages;

pub use library::{GameLibrary, SavedGame};
pub use messages::{ErrorDetails, ErrorKind, InboundMessage, OutboundMessage};
