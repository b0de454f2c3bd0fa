//! Key-value persistence seam and the in-memory backend.

use dashmap::DashMap;

use crate::error::StorageError;

/// A byte-oriented key-value store.
///
/// Backends are shared with the persistence workers, so they must be usable
/// from several threads at once.
pub trait KeyValueStore: Send + Sync {
    /// Returns the bytes stored under `key`, or `None` if there are none.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;
}

/// Concurrent in-memory store. Contents are lost when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if a value is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.entries.insert(key.to_owned(), value.to_vec());
        Ok(())
    }
}
