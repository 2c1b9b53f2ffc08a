//! Identity provider contract.

use std::fmt;
use std::sync::Mutex;

use crate::session::AuthUser;
use crate::Result;

/// Callback invoked on every auth-state report from the provider.
///
/// `Some(user)` means an active session, `None` means signed out.
pub type AuthStateListener = Box<dyn Fn(Option<&AuthUser>) + Send + Sync>;

/// External authentication backend.
///
/// The crate treats the provider as a black box: it issues and validates
/// sessions, and pushes auth-state reports over the subscription channel.
/// Implementations must report the current state to a new listener
/// immediately upon subscription; that first report is what resolves the
/// initial status at boot.
#[allow(async_fn_in_trait)]
pub trait IdentityProvider {
    /// Authenticate with email and password.
    ///
    /// Fails with `InvalidCredentials`, `UserNotFound`, `UserDisabled`,
    /// `RateLimited`, or `Unknown`.
    async fn login(&self, email: &str, password: &str) -> Result<AuthUser>;

    /// Create an account and sign it in.
    ///
    /// Fails with `EmailAlreadyInUse`, `WeakPassword`, `InvalidEmail`,
    /// `RateLimited`, or `Unknown`.
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser>;

    /// Send a password-reset email.
    ///
    /// Fails with `UserNotFound`, `InvalidEmail`, `RateLimited`, or
    /// `Unknown`.
    async fn request_password_reset(&self, email: &str) -> Result<()>;

    /// Sign the current session out. Best-effort; fails only on
    /// transport-level errors.
    async fn logout(&self) -> Result<()>;

    /// Token of the current session, `None` when signed out.
    async fn id_token(&self) -> Result<Option<String>>;

    /// Register a listener on the auth-state channel.
    ///
    /// Reports are delivered in the order the provider emits them, exactly
    /// once per report. The returned guard keeps the subscription alive;
    /// dropping or releasing it unsubscribes.
    fn subscribe_auth_state(&self, listener: AuthStateListener) -> Result<Subscription>;
}

/// Handle for an active auth-state subscription.
///
/// The provider-side release logic runs at most once, whether triggered by
/// [`Subscription::release`] or by drop; further calls are no-ops.
pub struct Subscription {
    release: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl Subscription {
    /// Wrap a provider-side release closure.
    pub fn new<F>(release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            release: Mutex::new(Some(Box::new(release))),
        }
    }

    /// Release the subscription. Safe to call more than once.
    pub fn release(&self) {
        if let Ok(mut slot) = self.release.lock() {
            if let Some(release) = slot.take() {
                release();
            }
        }
    }

    /// Whether the subscription has already been released.
    pub fn is_released(&self) -> bool {
        self.release.lock().map(|slot| slot.is_none()).unwrap_or(true)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("released", &self.is_released())
            .finish()
    }
}
