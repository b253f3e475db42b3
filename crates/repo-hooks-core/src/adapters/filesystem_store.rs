//! # Filesystem Key-Value Store
//!
//! Local filesystem implementation of the KeyValueStore trait.
//!
//! Each key is stored as one file named by the hex SHA-1 digest of the key,
//! so arbitrary keys map to safe, fixed-length file names.

use crate::key_value::{KeyValueStore, StorageError, StorageHealthStatus};
use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use sha1::{Digest, Sha1};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

const VALUE_EXTENSION: &str = "value";

/// Filesystem-based key-value store
///
/// # Examples
///
/// ```no_run
/// use repo_hooks_core::adapters::FilesystemKeyValueStore;
/// use std::path::PathBuf;
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = FilesystemKeyValueStore::new(PathBuf::from("./data/webhooks")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FilesystemKeyValueStore {
    base_path: PathBuf,
    temp_counter: AtomicU64,
    closed: AtomicBool,
}

impl FilesystemKeyValueStore {
    /// Create new filesystem store
    ///
    /// # Errors
    ///
    /// Returns error if the base directory cannot be created.
    pub async fn new(base_path: PathBuf) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path)
            .await
            .map_err(|e| io_error(&base_path, e))?;

        Ok(Self {
            base_path,
            temp_counter: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        })
    }

    /// Base directory of the store
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get full path for a key
    ///
    /// The name length does not depend on the key, so long scopes stay
    /// under the file name limit.
    fn value_path(&self, key: &str) -> PathBuf {
        let digest = Sha1::digest(key.as_bytes());
        self.base_path
            .join(format!("{}.{}", hex::encode(digest), VALUE_EXTENSION))
    }

    /// Unique temporary path next to `target`
    fn temp_path(&self, target: &Path) -> PathBuf {
        let n = self.temp_counter.fetch_add(1, Ordering::Relaxed);
        target.with_extension(format!("{}.{}.tmp", std::process::id(), n))
    }

    fn ensure_open(&self) -> Result<(), StorageError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StorageError::Closed);
        }
        Ok(())
    }
}

/// Create `path`, write `value`, and flush it to disk
async fn write_synced(path: &Path, value: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(value).await?;
    file.flush().await?;
    file.sync_all().await
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[async_trait]
impl KeyValueStore for FilesystemKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StorageError> {
        self.ensure_open()?;
        let path = self.value_path(key);

        match fs::read(&path).await {
            Ok(contents) => Ok(Some(Bytes::from(contents))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<(), StorageError> {
        self.ensure_open()?;
        let path = self.value_path(key);
        let temp_path = self.temp_path(&path);

        // Write to temporary file first (atomic write pattern)
        if let Err(e) = write_synced(&temp_path, &value).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(io_error(&temp_path, e));
        }

        // Rename over the previous value (atomic on most filesystems)
        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(io_error(&path, e));
        }

        debug!(key = %key, bytes = value.len(), "Stored value");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.ensure_open()?;
        let path = self.value_path(key);

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    async fn health_check(&self) -> Result<StorageHealthStatus, StorageError> {
        if self.closed.load(Ordering::Acquire) {
            return Ok(StorageHealthStatus {
                healthy: false,
                backend: "filesystem".to_string(),
                error_message: Some("store is closed".to_string()),
            });
        }

        let status = match fs::metadata(&self.base_path).await {
            Ok(meta) if meta.is_dir() => StorageHealthStatus {
                healthy: true,
                backend: "filesystem".to_string(),
                error_message: None,
            },
            Ok(_) => StorageHealthStatus {
                healthy: false,
                backend: "filesystem".to_string(),
                error_message: Some(format!(
                    "{} is not a directory",
                    self.base_path.display()
                )),
            },
            Err(e) => StorageHealthStatus {
                healthy: false,
                backend: "filesystem".to_string(),
                error_message: Some(e.to_string()),
            },
        };

        Ok(status)
    }

    async fn close(&self) -> Result<(), StorageError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

#[cfg(test)]
#[path = "filesystem_store_tests.rs"]
mod tests;
