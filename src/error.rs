//! Error types for session-gate.

use std::time::Duration;

use thiserror::Error;

/// Main error type for authentication operations.
///
/// Provider-reported kinds and local validation failures share one flat
/// enum; callers match on the kind, UIs display [`AuthError::user_message`].
#[derive(Error, Debug)]
pub enum AuthError {
    /// Password did not match the account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No account exists for the given email.
    #[error("user not found")]
    UserNotFound,

    /// The account exists but has been disabled.
    #[error("user disabled")]
    UserDisabled,

    /// Sign-up attempted with an email that already has an account.
    #[error("email already in use")]
    EmailAlreadyInUse,

    /// Password shorter than the required minimum.
    #[error("weak password: minimum {min_len} characters")]
    WeakPassword {
        /// Required minimum length.
        min_len: usize,
    },

    /// Email is not structurally valid.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// Email field was empty.
    #[error("email is required")]
    EmptyEmail,

    /// Password field was empty.
    #[error("password is required")]
    EmptyPassword,

    /// Too many attempts in the current window.
    #[error("rate limited, retry in {retry_after:?}")]
    RateLimited {
        /// Time until the window opens again.
        retry_after: Duration,
    },

    /// Transport-level failure talking to the provider.
    #[error("transport error: {0}")]
    Transport(String),

    /// Provider reported an error this crate does not classify.
    #[error("provider error: {0}")]
    Unknown(String),

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,
}

impl AuthError {
    /// End-user copy for this error kind.
    ///
    /// The known provider kinds carry the message a UI layer shows verbatim;
    /// everything else falls back to a generic line.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "Incorrect password.",
            Self::UserNotFound => "No account found with this email address.",
            Self::UserDisabled => "This account has been disabled.",
            Self::EmailAlreadyInUse => "An account with this email already exists.",
            Self::WeakPassword { .. } => "Password must be at least 6 characters",
            Self::InvalidEmail(_) => "Please enter a valid email address",
            Self::EmptyEmail => "Email is required",
            Self::EmptyPassword => "Password is required",
            Self::RateLimited { .. } => "Too many failed attempts. Please try again later.",
            Self::Transport(_) | Self::Unknown(_) | Self::LockPoisoned => {
                "An unexpected error occurred. Please try again."
            }
        }
    }

    /// Whether the error came from the provider rather than local checks.
    pub fn is_provider_error(&self) -> bool {
        !matches!(
            self,
            Self::WeakPassword { .. }
                | Self::InvalidEmail(_)
                | Self::EmptyEmail
                | Self::EmptyPassword
                | Self::LockPoisoned
        )
    }
}

/// Convenience Result type for session-gate operations.
pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_not_found_display() {
        let err = AuthError::UserNotFound;
        assert!(err.to_string().contains("not found"));
        assert!(err.user_message().contains("No account found"));
    }

    #[test]
    fn test_weak_password_display() {
        let err = AuthError::WeakPassword { min_len: 6 };
        assert!(err.to_string().contains('6'));
        assert!(err.user_message().contains("at least 6"));
    }

    #[test]
    fn test_invalid_email_display() {
        let err = AuthError::InvalidEmail("not-an-email".into());
        assert!(err.to_string().contains("not-an-email"));
    }

    #[test]
    fn test_rate_limited_display() {
        let err = AuthError::RateLimited {
            retry_after: Duration::from_secs(42),
        };
        assert!(err.to_string().contains("rate limited"));
        assert!(err.user_message().contains("Too many failed attempts"));
    }

    #[test]
    fn test_unknown_falls_back_to_generic_message() {
        let err = AuthError::Unknown("internal".into());
        assert_eq!(
            err.user_message(),
            "An unexpected error occurred. Please try again."
        );
    }

    #[test]
    fn test_provider_error_classification() {
        assert!(AuthError::InvalidCredentials.is_provider_error());
        assert!(AuthError::Transport("offline".into()).is_provider_error());
        assert!(!AuthError::EmptyEmail.is_provider_error());
        assert!(!AuthError::WeakPassword { min_len: 6 }.is_provider_error());
    }
}
