//! Bridge composition - wires the session, router and library together
//!
//! Everything here is an explicitly owned object handed over by value or
//! handle; there are no ambient globals, so tests can substitute an
//! in-memory store or drive the channel seams directly.

use std::sync::atomic::AtomicU8;
use std::sync::Arc;

use tokio::sync::mpsc;

use hearth_protocol::{ErrorDetails, ErrorKind};

use crate::application::services::LibraryService;
use crate::infrastructure::endpoint;
use crate::infrastructure::messaging::{
    router_task, CommandSender, ConnectionState, ConnectionStateObserver, UiEvent,
};
use crate::infrastructure::websocket::{
    spawn_session, FrameSender, ReconnectPolicy, SessionHandle, SessionParts,
};
use crate::ports::outbound::StoragePort;

/// Environment variable carrying the client-visible hostname.
pub const HOSTNAME_ENV: &str = "HEARTH_HOSTNAME";

/// Configuration for a bridge instance.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Client-visible hostname the server endpoint is derived from.
    pub hostname: String,
    /// Reconnection policy for the transport session.
    pub reconnect: ReconnectPolicy,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl BridgeConfig {
    /// Read configuration from the environment, defaulting to localhost.
    pub fn from_env() -> Self {
        let hostname =
            std::env::var(HOSTNAME_ENV).unwrap_or_else(|_| "localhost".to_string());
        Self {
            hostname,
            ..Self::default()
        }
    }
}

/// A running bridge: the two UI-facing channel ends plus the control handle.
pub struct Bridge {
    pub commands: CommandSender,
    pub events: mpsc::UnboundedReceiver<UiEvent>,
    pub handle: BridgeHandle,
}

/// Control handle for a running bridge.
///
/// Dropping the handle does not stop the bridge; call [`Self::shutdown`].
pub struct BridgeHandle {
    session: Option<SessionHandle>,
    observer: ConnectionStateObserver,
}

impl BridgeHandle {
    pub fn state(&self) -> ConnectionState {
        self.observer.state()
    }

    pub fn is_connected(&self) -> bool {
        self.observer.is_connected()
    }

    /// Stop the transport session. The router stops once the UI side drops
    /// its [`CommandSender`].
    pub fn shutdown(self) {
        if let Some(session) = self.session {
            session.shutdown();
        }
    }
}

/// Assemble and start the bridge. Must be called from within a tokio runtime.
///
/// A malformed hostname does not fail construction: it is reported on the
/// event channel and the bridge runs in library-only mode, so the UI learns
/// of the failure the same way it learns of every other one.
pub fn spawn_bridge(config: BridgeConfig, store: Arc<dyn StoragePort>) -> Bridge {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let library = LibraryService::new(store);

    // The UI sees the current library before any socket traffic.
    match library.list() {
        Ok(games) => {
            tracing::debug!(count = games.len(), "loaded game library");
            let _ = event_tx.send(UiEvent::LibraryLoaded(games));
        }
        Err(e) => {
            tracing::warn!("initial library read failed: {e}");
            let _ = event_tx.send(UiEvent::Error(ErrorDetails::new(
                ErrorKind::PersistenceError,
                e.to_string(),
            )));
        }
    }

    let (frames, socket_events, session, observer) = match endpoint::resolve(&config.hostname) {
        Ok(url) => {
            tracing::info!(url = %url, "resolved server endpoint");
            let SessionParts {
                handle,
                frames,
                events,
                observer,
            } = spawn_session(url, config.reconnect);
            (frames, events, Some(handle), observer)
        }
        Err(e) => {
            tracing::error!(hostname = %config.hostname, "endpoint resolution failed: {e}");
            let _ = event_tx.send(UiEvent::Error(ErrorDetails::new(
                ErrorKind::MalformedHostname,
                e.to_string(),
            )));
            // Library-only mode: a dormant frame sink and an already-closed
            // socket event stream.
            let (frame_tx, _) = mpsc::unbounded_channel();
            let (_, socket_rx) = mpsc::unbounded_channel();
            let state = Arc::new(AtomicU8::new(ConnectionState::Disconnected.to_u8()));
            (
                FrameSender::new(frame_tx),
                socket_rx,
                None,
                ConnectionStateObserver::new(state),
            )
        }
    };

    tokio::spawn(router_task(cmd_rx, socket_events, frames, library, event_tx));

    Bridge {
        commands: CommandSender::new(cmd_tx),
        events: event_rx,
        handle: BridgeHandle { session, observer },
    }
}
