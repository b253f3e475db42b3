//! Tests for the repo-hooks-core library module.

use super::*;

#[test]
fn test_scope_in_default_namespace() {
    let scope = RepositoryScope::in_default_namespace("debian").unwrap();

    assert_eq!(scope.namespace(), "base");
    assert_eq!(scope.repo(), "debian");
    assert_eq!(scope.to_string(), "base/debian");
}

#[test]
fn test_scope_storage_key() {
    let scope = RepositoryScope::new("testing", "ubuntu").unwrap();
    assert_eq!(scope.storage_key(), "webhooks/testing/ubuntu");
}

#[test]
fn test_scope_storage_keys_do_not_collide() {
    let a = RepositoryScope::new("base", "debian").unwrap();
    let b = RepositoryScope::new("debian", "base").unwrap();

    assert_ne!(a.storage_key(), b.storage_key());
}

#[test]
fn test_scope_validation() {
    // Empty segments
    assert!(matches!(
        RepositoryScope::new("", "debian"),
        Err(ValidationError::Required { .. })
    ));
    assert!(matches!(
        RepositoryScope::new("base", ""),
        Err(ValidationError::Required { .. })
    ));

    // Separator inside a segment would make the storage key ambiguous
    assert!(matches!(
        RepositoryScope::new("base/x", "debian"),
        Err(ValidationError::InvalidCharacters { .. })
    ));
    assert!(matches!(
        RepositoryScope::new("base", "deb ian"),
        Err(ValidationError::InvalidCharacters { .. })
    ));

    // Too long
    let too_long = "a".repeat(129);
    assert!(matches!(
        RepositoryScope::new("base", too_long),
        Err(ValidationError::TooLong { .. })
    ));
}

#[test]
fn test_scope_accepts_punctuation() {
    let scope = RepositoryScope::new("my-org", "repo.v2_beta");
    assert!(scope.is_ok());
}
