//! Persisted and listed shapes of a webhook registration.

use crate::events::WebhookEvent;
use crate::identifier::WebhookId;
use serde::{Deserialize, Serialize};

/// One webhook registration as stored in a repository's collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookRecord {
    /// Identifier derived from `url`
    pub id: WebhookId,

    /// Destination the webhook notifies
    pub url: String,

    /// Subscribed events, in the order they were requested
    pub events: Vec<WebhookEvent>,

    /// Always `true` for newly created registrations
    pub active: bool,
}

impl WebhookRecord {
    /// Create an active registration, deriving its identifier from `url`
    pub fn new(url: impl Into<String>, events: Vec<WebhookEvent>) -> Self {
        let url = url.into();
        Self {
            id: WebhookId::derive(&url),
            url,
            events,
            active: true,
        }
    }

    /// Check whether the registration subscribes to `event`
    pub fn subscribes_to(&self, event: WebhookEvent) -> bool {
        self.events.contains(&event)
    }

    /// Render the listing view of this registration
    pub fn to_view(&self) -> WebhookView {
        WebhookView {
            id: self.id.clone(),
            url: self.url.clone(),
            new: self.subscribes_to(WebhookEvent::New),
            existing: self.subscribes_to(WebhookEvent::Existing),
            active: self.active,
        }
    }
}

/// Listing view of a registration with one flag per recognized event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookView {
    pub id: WebhookId,
    pub url: String,
    pub new: bool,
    pub existing: bool,
    pub active: bool,
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
