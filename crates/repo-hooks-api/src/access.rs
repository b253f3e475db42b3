//! Access policy applied to webhook routes before path segments are validated.
//!
//! | Type | Use |
//! |------|-----|
//! | [`AllowAllAccess`] | No `security.api_token` configured |
//! | [`BearerTokenAccess`] | Shared token presented as `Authorization: Bearer <token>` |

use axum::http::{header, HeaderMap};
use subtle::ConstantTimeEq;
use tracing::warn;

/// Why a request failed the access policy
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    #[error("missing bearer token")]
    MissingCredentials,

    #[error("invalid bearer token")]
    InvalidCredentials,
}

/// Decides whether a caller may read or change webhooks
///
/// Runs on the raw request, so an unauthenticated caller learns nothing
/// about which paths would be valid.
pub trait AccessPolicy: Send + Sync {
    /// Check the request headers against the policy
    fn authorize(&self, headers: &HeaderMap) -> Result<(), AccessDenied>;
}

/// Policy that accepts every caller
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllAccess;

impl AccessPolicy for AllowAllAccess {
    fn authorize(&self, _headers: &HeaderMap) -> Result<(), AccessDenied> {
        Ok(())
    }
}

/// Policy requiring a single shared bearer token
///
/// The comparison runs in constant time.
pub struct BearerTokenAccess {
    token: String,
}

impl BearerTokenAccess {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for BearerTokenAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerTokenAccess")
            .field("token", &"<REDACTED>")
            .finish()
    }
}

impl AccessPolicy for BearerTokenAccess {
    fn authorize(&self, headers: &HeaderMap) -> Result<(), AccessDenied> {
        let presented = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or(AccessDenied::MissingCredentials)?;

        if bool::from(presented.as_bytes().ct_eq(self.token.as_bytes())) {
            Ok(())
        } else {
            warn!("Rejected request with wrong bearer token");
            Err(AccessDenied::InvalidCredentials)
        }
    }
}

/// Build the policy matching a configured token
pub fn policy_for_token(token: Option<&str>) -> std::sync::Arc<dyn AccessPolicy> {
    match token {
        Some(token) => std::sync::Arc::new(BearerTokenAccess::new(token)),
        None => std::sync::Arc::new(AllowAllAccess),
    }
}

#[cfg(test)]
#[path = "access_tests.rs"]
mod tests;
