//! Authentication status variants.

use super::AuthUser;

/// Current authentication status as reported by the identity provider.
///
/// A store starts at [`Unresolved`](SessionStatus::Unresolved) and leaves it
/// on the provider's first definitive report. After that the status moves
/// between [`Authenticated`](SessionStatus::Authenticated) and
/// [`Unauthenticated`](SessionStatus::Unauthenticated) as the user signs in
/// and out; nothing ever sets it back to `Unresolved`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No definitive report from the provider yet.
    #[default]
    Unresolved,
    /// Provider confirmed no active session.
    Unauthenticated,
    /// Provider confirmed an active session with its payload.
    Authenticated(AuthUser),
}

impl SessionStatus {
    /// Whether an active session is present.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionStatus::Authenticated(_))
    }

    /// Whether the provider has reported a definitive state yet.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, SessionStatus::Unresolved)
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            SessionStatus::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}
