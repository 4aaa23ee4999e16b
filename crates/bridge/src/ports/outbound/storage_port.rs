//! Storage Port - outbound port for the durable key-value capability
//!
//! The saved-game library lives in a single value under a fixed key; this
//! port abstracts the durable store so the library service can be tested
//! against an in-memory fake and so storage failures surface as values
//! instead of panics.

use thiserror::Error;

/// A storage read or write failure.
///
/// Persistence failures are reported to the UI application through the error
/// channel; they never terminate the bridge.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("storage read failed: {0}")]
    Read(String),
    #[error("storage write failed: {0}")]
    Write(String),
    #[error("stored data is corrupt: {0}")]
    Corrupt(String),
}

/// Durable key-value storage capability.
///
/// Implementations must be usable from the router task; all operations are
/// synchronous and complete before the next command is handled, which is what
/// makes read-modify-write sequences atomic with respect to other handlers.
#[cfg_attr(test, mockall::automock)]
pub trait StoragePort: Send + Sync {
    /// Load the value stored under `key`, or `None` if absent.
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Store `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &str) -> Result<(), PersistenceError>;

    /// Remove the value stored under `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}
