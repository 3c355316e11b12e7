//! Storage abstraction for persistence.

mod memory;
mod persistence;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStore;
pub use persistence::{
    LoadedSession, Persistence, SessionDefaults, CANVAS_HEIGHT_KEY, CANVAS_WIDTH_KEY, MOUNTED_TIME_KEY,
    PATHS_KEY, SESSION_KEYS,
};

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// A flat string key/value store, in the spirit of browser local storage.
///
/// Implementations can keep values in memory, on disk, or in a platform
/// store. Missing keys read as `Ok(None)`.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Check if a key exists.
    fn contains(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}
