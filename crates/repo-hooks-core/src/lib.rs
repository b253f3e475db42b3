//! # Repo-Hooks Core
//!
//! Core business logic for registering webhooks against repositories.
//!
//! This crate contains the domain logic for validating subscribed events,
//! deriving stable webhook identifiers, and maintaining the per-repository
//! webhook collection on top of a key-value store.
//!
//! ## Architecture
//!
//! - Business logic depends only on the [`KeyValueStore`] trait
//! - Storage implementations are injected at runtime
//! - Authentication and authorization happen before a call reaches this crate
//!
//! ## Usage
//!
//! ```rust
//! use repo_hooks_core::{RepositoryScope, WebhookId};
//!
//! let scope = RepositoryScope::in_default_namespace("debian").unwrap();
//! assert_eq!(scope.storage_key(), "webhooks/base/debian");
//!
//! let id = WebhookId::derive("http://www.example.com/hook");
//! assert_eq!(id.as_str(), "d55ecc09f4cd1779d592b7c7f4bf3006fcb62a4c");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace used when a request only names the repository
pub const DEFAULT_NAMESPACE: &str = "base";

/// Maximum length of a namespace or repository name
const MAX_SEGMENT_LENGTH: usize = 128;

// ============================================================================
// Repository Scope
// ============================================================================

/// The repository a webhook collection belongs to
///
/// A scope is the pair `(namespace, repo)`. Both segments are restricted so
/// that the storage key built from them is unambiguous: two different scopes
/// always produce two different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryScope {
    namespace: String,
    repo: String,
}

impl RepositoryScope {
    /// Create a scope with validation
    ///
    /// # Validation Rules
    /// - Both segments must be 1-128 characters
    /// - Segments must not contain `/`, whitespace, or control characters
    pub fn new(
        namespace: impl Into<String>,
        repo: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let namespace = namespace.into();
        let repo = repo.into();

        validate_segment("namespace", &namespace)?;
        validate_segment("repo", &repo)?;

        Ok(Self { namespace, repo })
    }

    /// Create a scope in the [`DEFAULT_NAMESPACE`]
    pub fn in_default_namespace(repo: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(DEFAULT_NAMESPACE, repo)
    }

    /// Get namespace
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Get repository name
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Key under which this scope's webhook collection is stored
    ///
    /// Format: `webhooks/{namespace}/{repo}`
    pub fn storage_key(&self) -> String {
        format!("webhooks/{}/{}", self.namespace, self.repo)
    }
}

impl fmt::Display for RepositoryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.repo)
    }
}

fn validate_segment(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_SEGMENT_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max_length: MAX_SEGMENT_LENGTH,
        });
    }

    if value
        .chars()
        .any(|c| c == '/' || c.is_whitespace() || c.is_control())
    {
        return Err(ValidationError::InvalidCharacters {
            field: field.to_string(),
            invalid_chars: "slash, whitespace, or control characters".to_string(),
        });
    }

    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// High-level error categorization for alerting and HTTP mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Temporary failures that may succeed on a later attempt
    Transient,
    /// Failures caused by the request itself
    Permanent,
}

/// Error type for input validation failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("Field '{field}' is required")]
    Required { field: String },

    #[error("Field '{field}' exceeds maximum length of {max_length}")]
    TooLong { field: String, max_length: usize },

    #[error("Field '{field}' contains invalid characters: {invalid_chars}")]
    InvalidCharacters {
        field: String,
        invalid_chars: String,
    },
}

/// Error type for string parsing failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid format: expected {expected}, got '{actual}'")]
    InvalidFormat { expected: String, actual: String },
}

// ============================================================================
// Module declarations
// ============================================================================

/// Recognized webhook events and their validation
pub mod events;

/// Webhook identifier derivation
pub mod identifier;

/// Persisted and listed shapes of a webhook registration
pub mod record;

/// Key-value storage interface
pub mod key_value;

/// Storage adapters
pub mod adapters;

/// Per-repository webhook collection access
pub mod repository;

/// Webhook registration operations
pub mod service;

// Re-export key types for convenience
pub use adapters::{FilesystemKeyValueStore, InMemoryKeyValueStore};
pub use events::{EventCatalog, EventError, WebhookEvent};
pub use identifier::WebhookId;
pub use key_value::{KeyValueStore, StorageError, StorageHealthStatus};
pub use record::{WebhookRecord, WebhookView};
pub use repository::{RepositoryError, UpsertOutcome, WebhookRepository};
pub use service::{
    AddWebhookRequest, WebhookCreated, WebhookRemoved, WebhookService, WebhookServiceError,
};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
