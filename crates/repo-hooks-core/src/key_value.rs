//! # Key-Value Storage Interface
//!
//! The narrow storage contract webhook collections are persisted through.
//! Values are opaque bytes; callers own their encoding.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

/// Interface for key-value storage operations
///
/// Implementations must make `set` atomic with respect to `get`: a reader
/// observes either the previous value or the new one, never a mix.
///
/// A store is opened by the process at start-up, passed to its users, and
/// closed with [`KeyValueStore::close`] at shutdown.
///
/// # Examples
///
/// ```no_run
/// use repo_hooks_core::{InMemoryKeyValueStore, KeyValueStore, StorageError};
/// use bytes::Bytes;
/// # async fn example() -> Result<(), StorageError> {
/// let store = InMemoryKeyValueStore::new();
/// store.set("webhooks/base/debian", Bytes::from_static(b"[]")).await?;
/// assert!(store.get("webhooks/base/debian").await?.is_some());
/// store.close().await?;
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if absent
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StorageError>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: Bytes) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Check store connectivity
    async fn health_check(&self) -> Result<StorageHealthStatus, StorageError>;

    /// Release the store. Later calls fail with [`StorageError::Closed`].
    async fn close(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Health status of a key-value store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageHealthStatus {
    /// Overall health status
    pub healthy: bool,

    /// Backend name, e.g. "memory" or "filesystem"
    pub backend: String,

    /// Error message if unhealthy
    pub error_message: Option<String>,
}

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// Storage backend could not be reached
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    /// Stored bytes could not be encoded or decoded
    #[error("Serialization failed: {message}")]
    SerializationFailed { message: String },

    /// Underlying I/O failure
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Store was used after being closed
    #[error("Store is closed")]
    Closed,

    /// Internal storage error
    #[error("Internal storage error: {message}")]
    Internal { message: String },
}

impl StorageError {
    /// Check if error is transient and worth retrying by the caller
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. } | Self::Io { .. })
    }
}
