//! # In-Memory Key-Value Store
//!
//! Thread-safe in-memory implementation for testing and ephemeral deployments.
//! Contents are lost when the process exits.

use crate::key_value::{KeyValueStore, StorageError, StorageHealthStatus};
use async_trait::async_trait;
use bytes::Bytes;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, RwLock,
    },
};

/// Thread-safe in-memory key-value store
///
/// Uses RwLock for concurrent access with minimal contention. Clones share
/// the same underlying map.
#[derive(Clone, Default)]
pub struct InMemoryKeyValueStore {
    entries: Arc<RwLock<HashMap<String, Bytes>>>,
    closed: Arc<AtomicBool>,
}

impl InMemoryKeyValueStore {
    /// Create new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Check whether the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_open(&self) -> Result<(), StorageError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StorageError::Closed);
        }
        Ok(())
    }
}

fn poisoned<T>(_: T) -> StorageError {
    StorageError::Internal {
        message: "in-memory store lock poisoned".to_string(),
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StorageError> {
        self.ensure_open()?;
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<(), StorageError> {
        self.ensure_open()?;
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.ensure_open()?;
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.remove(key);
        Ok(())
    }

    async fn health_check(&self) -> Result<StorageHealthStatus, StorageError> {
        let closed = self.closed.load(Ordering::Acquire);
        Ok(StorageHealthStatus {
            healthy: !closed,
            backend: "memory".to_string(),
            error_message: closed.then(|| "store is closed".to_string()),
        })
    }

    async fn close(&self) -> Result<(), StorageError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_store_tests.rs"]
mod tests;
