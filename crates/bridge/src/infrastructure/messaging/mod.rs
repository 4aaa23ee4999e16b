//! Messaging - the typed channels between the UI application and the bridge

pub mod connection;
pub mod ports;
pub mod router;

pub use connection::{set_connection_state, ConnectionState, ConnectionStateObserver};
pub use ports::{CommandSender, UiCommand, UiEvent};
pub use router::router_task;
