//! Library service - reconciles persistence intents against the store
//!
//! The library is stored as one JSON array under a fixed key. Every operation
//! re-reads the store (read-through, no cache) so writes from another process
//! are always visible. Single-consumer routing makes each read-modify-write
//! here atomic with respect to other commands.

use std::sync::Arc;

use hearth_protocol::{GameLibrary, SavedGame};

use crate::ports::outbound::{PersistenceError, StoragePort};

/// Fixed process-wide storage key for the saved-game library.
pub const GAME_LIBRARY_KEY: &str = "game_library";

#[derive(Clone)]
pub struct LibraryService {
    store: Arc<dyn StoragePort>,
}

impl LibraryService {
    pub fn new(store: Arc<dyn StoragePort>) -> Self {
        Self { store }
    }

    /// The current library, freshly re-read from the store.
    pub fn list(&self) -> Result<GameLibrary, PersistenceError> {
        match self.store.load(GAME_LIBRARY_KEY)? {
            None => Ok(GameLibrary::new()),
            Some(text) => {
                serde_json::from_str(&text).map_err(|e| PersistenceError::Corrupt(e.to_string()))
            }
        }
    }

    /// Write `game` into the library, replacing any record with the same
    /// identity key.
    pub fn save(&self, game: SavedGame) -> Result<(), PersistenceError> {
        let mut library = self.load_for_update()?;
        library.upsert(game);
        self.write(&library)
    }

    /// Remove the record matching `game`'s identity key.
    ///
    /// An absent key is a no-op and writes nothing.
    pub fn remove(&self, game: &SavedGame) -> Result<(), PersistenceError> {
        let mut library = self.load_for_update()?;
        if library.remove_by_id(&game.game_id) {
            self.write(&library)?;
        }
        Ok(())
    }

    /// Like [`Self::list`], but a corrupt stored value degrades to an empty
    /// library so saving stays possible after corruption; the next write
    /// repairs the store.
    fn load_for_update(&self) -> Result<GameLibrary, PersistenceError> {
        match self.list() {
            Ok(library) => Ok(library),
            Err(PersistenceError::Corrupt(detail)) => {
                tracing::warn!("discarding corrupt game library: {detail}");
                Ok(GameLibrary::new())
            }
            Err(other) => Err(other),
        }
    }

    fn write(&self, library: &GameLibrary) -> Result<(), PersistenceError> {
        let text =
            serde_json::to_string(library).map_err(|e| PersistenceError::Write(e.to_string()))?;
        self.store.save(GAME_LIBRARY_KEY, &text)
    }
}
