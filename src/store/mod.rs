//! Durable key-value storage for session and cache state
//!
//! Everything the client persists (the bearer token and one record per cached
//! feature) goes through the [`KeyValueStore`] trait. Keys are disjoint, so no
//! cross-key locking is done at this layer.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use futures::future::BoxFuture;
use thiserror::Error;

/// Errors that can occur when accessing persisted state
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying filesystem operation failed
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Key contains characters that cannot be mapped to a storage slot
    #[error("Invalid storage key: '{0}'")]
    InvalidKey(String),

    /// Storage backend refused the operation
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous string-keyed storage that survives process restarts
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, or `None` if nothing is stored
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, StoreError>>;

    /// Replaces the value stored under `key`
    fn set<'a>(&'a self, key: &'a str, value: &'a str) -> BoxFuture<'a, Result<(), StoreError>>;

    /// Removes the value stored under `key`. Removing an absent key succeeds.
    fn remove<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StoreError>>;
}

/// Checks that a key is safe to use as a storage slot name
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}
