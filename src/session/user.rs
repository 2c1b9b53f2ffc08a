//! Signed-in user identity payload.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Global counter for locally generated user IDs.
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier of an authenticated user.
///
/// Providers assign arbitrary strings; [`UserId::generate`] mints local IDs
/// displayed as `user-XXXXXXXX` with X a hexadecimal digit, unique within a
/// single process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap a provider-assigned identifier.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Mint a new locally unique identifier.
    pub fn generate() -> Self {
        Self(format!("user-{:08x}", COUNTER.fetch_add(1, Ordering::Relaxed)))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The authenticated identity held while a user is signed in.
///
/// Replaced wholesale on every update, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Provider-assigned user identifier.
    pub uid: UserId,
    /// Email address, when the provider reports one.
    pub email: Option<String>,
    /// Display label, when the provider reports one.
    pub display_name: Option<String>,
}

impl AuthUser {
    /// Create a user payload with just an identifier.
    pub fn new(uid: UserId) -> Self {
        Self {
            uid,
            email: None,
            display_name: None,
        }
    }

    /// Create a user payload with an email address.
    pub fn with_email(uid: UserId, email: impl Into<String>) -> Self {
        Self {
            uid,
            email: Some(email.into()),
            display_name: None,
        }
    }

    /// Best label for showing this user in a UI: display name, then email,
    /// then the raw identifier.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or_else(|| self.uid.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_ids_unique() {
        let mut ids = HashSet::new();
        for _ in 0..10_000 {
            let id = UserId::generate();
            assert!(ids.insert(id.clone()), "duplicate ID generated: {}", id);
        }
    }

    #[test]
    fn test_generated_display_format() {
        let id = UserId::generate();
        assert!(id.as_str().starts_with("user-"));
        assert_eq!(id.as_str().len(), "user-".len() + 8);
    }

    #[test]
    fn test_wrapped_id_round_trips() {
        let id = UserId::new("ext-abc123");
        assert_eq!(id.to_string(), "ext-abc123");
        assert_eq!(id.as_str(), "ext-abc123");
    }

    #[test]
    fn test_label_preference_order() {
        let uid = UserId::new("u1");

        let mut user = AuthUser::new(uid.clone());
        assert_eq!(user.label(), "u1");

        user.email = Some("a@b.com".into());
        assert_eq!(user.label(), "a@b.com");

        user.display_name = Some("Ada".into());
        assert_eq!(user.label(), "Ada");
    }

    #[test]
    fn test_equality_is_payload_deep() {
        let a = AuthUser::with_email(UserId::new("u1"), "a@b.com");
        let b = AuthUser::with_email(UserId::new("u1"), "a@b.com");
        let c = AuthUser::with_email(UserId::new("u2"), "a@b.com");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
