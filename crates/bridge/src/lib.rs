//! Hearth Bridge - the message bridge between the game UI and the game server
//!
//! This crate owns everything that crosses the UI application boundary:
//! - a reconnecting WebSocket session to the game server
//!   ([`infrastructure::websocket`])
//! - the typed command/event channels the UI application plugs into
//!   ([`infrastructure::messaging`])
//! - synchronization of the locally persisted saved-game library
//!   ([`application::services::library_service`])
//!
//! The UI application itself is a black box: it consumes [`UiEvent`]s and
//! produces [`UiCommand`]s, and the bridge never interprets message payloads.
//!
//! [`UiEvent`]: infrastructure::messaging::UiEvent
//! [`UiCommand`]: infrastructure::messaging::UiCommand

pub mod application;
pub mod infrastructure;
pub mod ports;
pub mod runner;
