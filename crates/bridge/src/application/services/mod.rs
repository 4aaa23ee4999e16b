pub mod library_service;

pub use library_service::{LibraryService, GAME_LIBRARY_KEY};
