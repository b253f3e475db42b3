//! Tests for [`AllowAllAccess`] and [`BearerTokenAccess`].

use super::*;
use axum::http::HeaderValue;

fn headers_with(authorization: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(authorization).unwrap(),
    );
    headers
}

#[test]
fn test_allow_all_accepts_anonymous_requests() {
    assert!(AllowAllAccess.authorize(&HeaderMap::new()).is_ok());
}

#[test]
fn test_bearer_accepts_matching_token() {
    let policy = BearerTokenAccess::new("s3cret");
    assert!(policy
        .authorize(&headers_with("Bearer s3cret"))
        .is_ok());
}

#[test]
fn test_bearer_rejects_missing_header() {
    let policy = BearerTokenAccess::new("s3cret");
    assert_eq!(
        policy.authorize(&HeaderMap::new()),
        Err(AccessDenied::MissingCredentials)
    );
}

#[test]
fn test_bearer_rejects_other_schemes() {
    let policy = BearerTokenAccess::new("s3cret");
    assert_eq!(
        policy.authorize(&headers_with("Basic czNjcmV0")),
        Err(AccessDenied::MissingCredentials)
    );
}

#[test]
fn test_bearer_rejects_wrong_token() {
    let policy = BearerTokenAccess::new("s3cret");
    assert_eq!(
        policy.authorize(&headers_with("Bearer s3cre")),
        Err(AccessDenied::InvalidCredentials)
    );
    assert_eq!(
        policy.authorize(&headers_with("Bearer s3cret-and-more")),
        Err(AccessDenied::InvalidCredentials)
    );
}

#[test]
fn test_bearer_debug_redacts_token() {
    let debug_str = format!("{:?}", BearerTokenAccess::new("super-sensitive"));
    assert!(!debug_str.contains("super-sensitive"));
    assert!(debug_str.contains("REDACTED"));
}

#[test]
fn test_policy_for_token_selects_implementation() {
    let open = policy_for_token(None);
    assert!(open.authorize(&HeaderMap::new()).is_ok());

    let guarded = policy_for_token(Some("s3cret"));
    assert!(guarded.authorize(&HeaderMap::new()).is_err());
}
