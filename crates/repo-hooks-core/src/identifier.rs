//! # Webhook Identifiers
//!
//! A webhook's identifier is the SHA-1 digest of its URL, hex encoded.
//! The URL bytes are hashed as given; no normalization is applied, so
//! `http://example.com/hook` and `http://example.com/hook/` are different
//! webhooks.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt;
use std::str::FromStr;

/// Length of the hex-encoded digest
const ID_LENGTH: usize = 40;

/// Stable identifier of a webhook registration
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WebhookId(String);

impl WebhookId {
    /// Derive the identifier for a webhook URL
    ///
    /// # Examples
    ///
    /// ```
    /// use repo_hooks_core::WebhookId;
    ///
    /// let id = WebhookId::derive("http://www.example.com/hook2");
    /// assert_eq!(id.as_str(), "bea56e556e7791c4a2cfec2d67b7fc8da9529851");
    /// ```
    pub fn derive(url: &str) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(url.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Get string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WebhookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for WebhookId {
    type Err = ParseError;

    /// Accepts 40 hex digits in either case; stored lowercase.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ID_LENGTH || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseError::InvalidFormat {
                expected: "40 hexadecimal characters".to_string(),
                actual: s.to_string(),
            });
        }

        Ok(Self(s.to_ascii_lowercase()))
    }
}

impl TryFrom<String> for WebhookId {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WebhookId> for String {
    fn from(id: WebhookId) -> Self {
        id.0
    }
}

#[cfg(test)]
#[path = "identifier_tests.rs"]
mod tests;
