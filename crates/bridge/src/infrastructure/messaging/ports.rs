//! UI-facing command and event channels
//!
//! These enums are the port contract between the black-box UI application and
//! the bridge: one named, typed channel per direction. Payloads pass through
//! unmodified apart from JSON (de)serialization; the bridge never interprets
//! message contents.

use tokio::sync::mpsc;

use anyhow::Result;
use hearth_protocol::{ErrorDetails, GameLibrary, InboundMessage, OutboundMessage, SavedGame};

/// Intents from the UI application into the bridge.
#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    /// Forward a message to the game server (transmit now, or queue until
    /// the next connect)
    SendMessage(OutboundMessage),
    /// Write a saved game into the library
    PersistNewGame(SavedGame),
    /// Delete a saved game from the library
    DeletePersistedGame(SavedGame),
    /// Re-read the library; the result arrives as [`UiEvent::LibraryLoaded`]
    RequestPersistedGames,
}

/// Signals from the bridge to the UI application.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// The server connection is up
    ConnectionEstablished,
    /// The server connection is down (close and error look the same here)
    ConnectionLost,
    /// A message arrived from the game server
    MessageReceived(InboundMessage),
    /// The saved-game library, delivered at startup and after every explicit
    /// reload request
    LibraryLoaded(GameLibrary),
    /// A failure report; the bridge keeps running
    Error(ErrorDetails),
}

/// Clonable sender for UI commands.
///
/// This is a concrete struct (not a trait) that can be cloned and shared;
/// the UI side holds it while the router consumes the paired receiver.
#[derive(Clone)]
pub struct CommandSender {
    tx: mpsc::UnboundedSender<UiCommand>,
}

impl CommandSender {
    pub fn new(tx: mpsc::UnboundedSender<UiCommand>) -> Self {
        Self { tx }
    }

    /// Forward a message to the game server.
    pub fn send_message(&self, message: OutboundMessage) -> Result<()> {
        self.send(UiCommand::SendMessage(message))
    }

    /// Write a saved game into the library.
    pub fn persist_new_game(&self, game: SavedGame) -> Result<()> {
        self.send(UiCommand::PersistNewGame(game))
    }

    /// Delete a saved game from the library.
    pub fn delete_persisted_game(&self, game: SavedGame) -> Result<()> {
        self.send(UiCommand::DeletePersistedGame(game))
    }

    /// Ask for a fresh read of the library.
    pub fn request_persisted_games(&self) -> Result<()> {
        self.send(UiCommand::RequestPersistedGames)
    }

    fn send(&self, command: UiCommand) -> Result<()> {
        self.tx
            .send(command)
            .map_err(|_| anyhow::anyhow!("bridge router is gone"))
    }
}
