//! Saved-game library records
//!
//! A `SavedGame` is identified by its `game_id`; the rest of the record is
//! opaque payload owned by the UI application. `GameLibrary` keeps insertion
//! order and enforces at most one record per identity key.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One saved game in the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedGame {
    /// Identity key: the library holds at most one record per `game_id`.
    pub game_id: String,
    /// Opaque payload, flattened so the stored record keeps the exact shape
    /// the UI application produced.
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl SavedGame {
    pub fn new(game_id: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            game_id: game_id.into(),
            data,
        }
    }
}

/// Ordered collection of saved games, unique per `game_id`.
///
/// Insertion order is significant and preserved through storage round-trips.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameLibrary {
    games: Vec<SavedGame>,
}

impl GameLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SavedGame> {
        self.games.iter()
    }

    pub fn get(&self, game_id: &str) -> Option<&SavedGame> {
        self.games.iter().find(|g| g.game_id == game_id)
    }

    pub fn contains(&self, game_id: &str) -> bool {
        self.get(game_id).is_some()
    }

    /// Insert a record, replacing any existing record with the same
    /// `game_id` in place (the replaced record keeps its slot in the order).
    pub fn upsert(&mut self, game: SavedGame) {
        match self.games.iter_mut().find(|g| g.game_id == game.game_id) {
            Some(existing) => *existing = game,
            None => self.games.push(game),
        }
    }

    /// Remove the first record matching `game_id`.
    ///
    /// Returns whether a record was removed; an absent key is a no-op.
    pub fn remove_by_id(&mut self, game_id: &str) -> bool {
        match self.games.iter().position(|g| g.game_id == game_id) {
            Some(index) => {
                self.games.remove(index);
                true
            }
            None => false,
        }
    }
}

impl From<Vec<SavedGame>> for GameLibrary {
    fn from(games: Vec<SavedGame>) -> Self {
        Self { games }
    }
}

impl IntoIterator for GameLibrary {
    type Item = SavedGame;
    type IntoIter = std::vec::IntoIter<SavedGame>;

    fn into_iter(self) -> Self::IntoIter {
        self.games.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn game(id: &str, label: &str) -> SavedGame {
        let mut data = Map::new();
        data.insert("label".to_string(), json!(label));
        SavedGame::new(id, data)
    }

    #[test]
    fn upsert_appends_new_records_in_order() {
        let mut library = GameLibrary::new();
        library.upsert(game("a", "first"));
        library.upsert(game("b", "second"));

        let ids: Vec<_> = library.iter().map(|g| g.game_id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn upsert_replaces_same_key_in_place() {
        let mut library = GameLibrary::new();
        library.upsert(game("a", "first"));
        library.upsert(game("b", "second"));
        library.upsert(game("a", "updated"));

        assert_eq!(library.len(), 2);
        let ids: Vec<_> = library.iter().map(|g| g.game_id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        let replaced = library.get("a").expect("record present");
        assert_eq!(replaced.data["label"], "updated");
    }

    #[test]
    fn remove_deletes_first_match_and_ignores_absent_keys() {
        let mut library = GameLibrary::new();
        library.upsert(game("a", "first"));
        library.upsert(game("b", "second"));

        assert!(library.remove_by_id("a"));
        assert!(!library.contains("a"));
        assert_eq!(library.len(), 1);

        // Absent key is a no-op, not an error
        assert!(!library.remove_by_id("missing"));
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn saved_game_roundtrips_with_flattened_payload() {
        let text = r#"{"game_id":"g-1","scenario":"keep","turn":12}"#;
        let parsed: SavedGame = serde_json::from_str(text).expect("deserialize");
        assert_eq!(parsed.game_id, "g-1");
        assert_eq!(parsed.data["scenario"], "keep");
        assert_eq!(parsed.data["turn"], 12);

        let back = serde_json::to_value(&parsed).expect("serialize");
        assert_eq!(back["game_id"], "g-1");
        assert_eq!(back["turn"], 12);
    }

    #[test]
    fn library_serializes_as_plain_array() {
        let mut library = GameLibrary::new();
        library.upsert(game("a", "first"));

        let value = serde_json::to_value(&library).expect("serialize");
        assert!(value.is_array());
        assert_eq!(value[0]["game_id"], "a");
    }
}
