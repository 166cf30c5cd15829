use crate::action::Action;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// KvStore is the replicated state machine: an in-memory map from key to value.
///
/// Mutations only ever come from applying committed log entries, in commit order, from the
/// replication driver. Reads may be served concurrently from any number of API handlers.
#[derive(Default)]
pub struct KvStore {
    entries: RwLock<HashMap<String, Bytes>>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KvStoreError {
    #[error("key '{0}' not found")]
    KeyNotFound(String),
}

impl KvStore {
    pub fn new() -> Self {
        KvStore::default()
    }

    /// Insert or replace the value stored at `key`.
    pub fn put(&self, key: String, value: Bytes) {
        self.write().insert(key, value);
    }

    pub fn get(&self, key: &str) -> Result<Bytes, KvStoreError> {
        self.read()
            .get(key)
            .cloned()
            .ok_or_else(|| KvStoreError::KeyNotFound(key.to_string()))
    }

    /// Remove `key`, returning the value it held.
    pub fn delete(&self, key: &str) -> Result<Bytes, KvStoreError> {
        self.write()
            .remove(key)
            .ok_or_else(|| KvStoreError::KeyNotFound(key.to_string()))
    }

    /// Apply a committed action. Deleting an absent key is not an error here: every replica
    /// applies the same entry and must arrive at the same state regardless.
    pub fn apply(&self, action: Action) {
        match action {
            Action::Put { key, value } => self.put(key, value),
            Action::Delete { key } => {
                let _ = self.delete(&key);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A panic while holding the lock can't leave the map half-updated (every mutation is a single
    // HashMap call), so poisoning is safe to ignore.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Bytes>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Bytes>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}
