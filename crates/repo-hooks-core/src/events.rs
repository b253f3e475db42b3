//! # Webhook Events
//!
//! The fixed set of events a webhook can subscribe to, and validation of
//! requested event names against that set.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An event a webhook can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookEvent {
    /// A new item appeared in the repository
    New,
    /// An existing item in the repository was updated
    Existing,
}

impl WebhookEvent {
    /// Get the wire name of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Existing => "existing",
        }
    }
}

impl fmt::Display for WebhookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WebhookEvent {
    type Err = EventError;

    /// Exact, case-sensitive match against the recognized names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventCatalog::RECOGNIZED
            .iter()
            .copied()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| EventError::Unsupported {
                name: s.to_string(),
            })
    }
}

/// Errors raised while validating requested events
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("{name} event is not supported")]
    Unsupported { name: String },
}

/// The universe of subscribable events
///
/// # Examples
///
/// ```
/// use repo_hooks_core::{EventCatalog, WebhookEvent};
///
/// let events = EventCatalog::validate(&[]).unwrap();
/// assert_eq!(events, vec![WebhookEvent::New]);
///
/// let err = EventCatalog::validate(&["other".to_string()]).unwrap_err();
/// assert_eq!(err.to_string(), "other event is not supported");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct EventCatalog;

impl EventCatalog {
    /// Every recognized event; name parsing matches against this set
    pub const RECOGNIZED: [WebhookEvent; 2] = [WebhookEvent::New, WebhookEvent::Existing];

    /// Events used when a request does not name any
    pub const DEFAULT: [WebhookEvent; 1] = [WebhookEvent::New];

    /// Substitute the default event names for an absent or empty request
    pub fn resolve(requested: Option<Vec<String>>) -> Vec<String> {
        match requested {
            Some(names) if !names.is_empty() => names,
            _ => Self::DEFAULT
                .iter()
                .map(|event| event.as_str().to_string())
                .collect(),
        }
    }

    /// Validate requested event names
    ///
    /// An empty slice validates as [`EventCatalog::DEFAULT`]. Otherwise names
    /// are checked in order and the first unrecognized one is reported. The
    /// returned events keep the order they were requested in.
    pub fn validate(names: &[String]) -> Result<Vec<WebhookEvent>, EventError> {
        if names.is_empty() {
            return Ok(Self::DEFAULT.to_vec());
        }

        names.iter().map(|name| name.parse::<WebhookEvent>()).collect()
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
