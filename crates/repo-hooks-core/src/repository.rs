//! # Webhook Repository
//!
//! Persists each repository scope's webhook collection as one JSON array in
//! the key-value store, keyed by [`RepositoryScope::storage_key`].
//!
//! Mutations read the whole collection, change it, and write it back. A
//! per-scope async lock is held across that cycle so two writers on the same
//! scope cannot overwrite each other's change. Different scopes never share
//! a lock.

use crate::identifier::WebhookId;
use crate::key_value::{KeyValueStore, StorageError, StorageHealthStatus};
use crate::record::WebhookRecord;
use crate::RepositoryScope;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, instrument};

/// Result of an upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The record was appended to the collection
    Inserted,
    /// A record with the same id was replaced in place
    Replaced,
}

/// Errors raised by collection mutations
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No record with the requested id exists in the scope
    #[error("Webhook not found: {id}")]
    NotFound { id: WebhookId },

    /// Underlying storage failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Per-repository webhook collection access
pub struct WebhookRepository {
    store: Arc<dyn KeyValueStore>,
    scope_locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl WebhookRepository {
    /// Create a repository over an opened store
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            scope_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Read a scope's collection in insertion order
    ///
    /// A scope that has never been written yields an empty collection.
    #[instrument(skip(self), fields(scope = %scope))]
    pub async fn list(&self, scope: &RepositoryScope) -> Result<Vec<WebhookRecord>, StorageError> {
        self.load(&scope.storage_key()).await
    }

    /// Insert `record`, or replace the record sharing its id in place
    #[instrument(skip(self, record), fields(scope = %scope, webhook_id = %record.id))]
    pub async fn upsert(
        &self,
        scope: &RepositoryScope,
        record: WebhookRecord,
    ) -> Result<UpsertOutcome, StorageError> {
        let key = scope.storage_key();
        let _guard = self.lock_scope(&key).await;

        let mut records = self.load(&key).await?;
        let outcome = match records.iter_mut().find(|existing| existing.id == record.id) {
            Some(existing) => {
                *existing = record;
                UpsertOutcome::Replaced
            }
            None => {
                records.push(record);
                UpsertOutcome::Inserted
            }
        };

        self.save(&key, &records).await?;
        debug!(outcome = ?outcome, count = records.len(), "Upserted webhook");
        Ok(outcome)
    }

    /// Remove and return the record with `id`
    ///
    /// The stored key is deleted once the collection becomes empty.
    #[instrument(skip(self), fields(scope = %scope, webhook_id = %id))]
    pub async fn remove_by_id(
        &self,
        scope: &RepositoryScope,
        id: &WebhookId,
    ) -> Result<WebhookRecord, RepositoryError> {
        let key = scope.storage_key();
        let _guard = self.lock_scope(&key).await;

        let mut records = self.load(&key).await?;
        let position = records
            .iter()
            .position(|record| &record.id == id)
            .ok_or_else(|| RepositoryError::NotFound { id: id.clone() })?;
        let removed = records.remove(position);

        if records.is_empty() {
            self.store.delete(&key).await?;
        } else {
            self.save(&key, &records).await?;
        }

        debug!(count = records.len(), "Removed webhook");
        Ok(removed)
    }

    /// Check the health of the underlying store
    pub async fn health_check(&self) -> Result<StorageHealthStatus, StorageError> {
        self.store.health_check().await
    }

    async fn load(&self, key: &str) -> Result<Vec<WebhookRecord>, StorageError> {
        match self.store.get(key).await? {
            Some(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| StorageError::SerializationFailed {
                    message: format!("Failed to decode webhook collection '{}': {}", key, e),
                })
            }
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, key: &str, records: &[WebhookRecord]) -> Result<(), StorageError> {
        let encoded =
            serde_json::to_vec(records).map_err(|e| StorageError::SerializationFailed {
                message: format!("Failed to encode webhook collection '{}': {}", key, e),
            })?;
        self.store.set(key, Bytes::from(encoded)).await
    }

    async fn lock_scope(&self, key: &str) -> ScopeLockGuard<'_> {
        let lock = {
            let mut locks = self
                .scope_locks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        ScopeLockGuard {
            repository: self,
            key: key.to_string(),
            guard: Some(lock.lock_owned().await),
        }
    }

    /// Drop the lock entry for `key` once nobody holds or awaits it
    fn release_scope_lock(&self, key: &str) {
        let mut locks = self
            .scope_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if locks
            .get(key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(key);
        }
    }

    #[cfg(test)]
    fn tracked_scope_locks(&self) -> usize {
        self.scope_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

/// Holds a scope's lock; releases it and prunes the lock table on drop
struct ScopeLockGuard<'a> {
    repository: &'a WebhookRepository,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ScopeLockGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.repository.release_scope_lock(&self.key);
    }
}

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;
