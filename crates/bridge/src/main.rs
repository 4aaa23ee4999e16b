//! Hearth Bridge - composition root binary.
//!
//! Runs the bridge headless: wires the file store and the server session,
//! then logs every event the UI application would consume.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hearth_bridge::infrastructure::messaging::UiEvent;
use hearth_bridge::infrastructure::storage::FileStore;
use hearth_bridge::ports::outbound::StoragePort;
use hearth_bridge::runner::{spawn_bridge, BridgeConfig};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hearth_bridge=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Hearth bridge");

    let config = BridgeConfig::from_env();
    let store: Arc<dyn StoragePort> = Arc::new(FileStore::new());

    let mut bridge = spawn_bridge(config, store);

    while let Some(event) = bridge.events.recv().await {
        match event {
            UiEvent::ConnectionEstablished => tracing::info!("websocket connection opened"),
            UiEvent::ConnectionLost => tracing::info!("websocket connection closed"),
            UiEvent::MessageReceived(message) => {
                tracing::info!(payload = %message.0, "message from server");
            }
            UiEvent::LibraryLoaded(library) => {
                tracing::info!(count = library.len(), "game library loaded");
            }
            UiEvent::Error(details) => {
                tracing::warn!(kind = ?details.kind, "{}", details.message);
            }
        }
    }
}
