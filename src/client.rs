//! Login, sign-up, password-reset, and logout flows.

use std::sync::Arc;

use tracing::{info, warn};

use crate::provider::{credentials, IdentityProvider};
use crate::session::{AuthUser, SessionStore};
use crate::Result;

/// UI-free authentication flows over a provider and a session store.
///
/// Both collaborators are injected; nothing here is process-global. On
/// completion each flow writes the store directly, ahead of the provider's
/// own echo over the subscription channel (the echo is an idempotent no-op
/// when the payload matches).
pub struct AuthClient<P> {
    provider: P,
    store: Arc<SessionStore>,
}

impl<P: IdentityProvider> AuthClient<P> {
    /// Create a client over a provider and a store.
    pub fn new(provider: P, store: Arc<SessionStore>) -> Self {
        Self { provider, store }
    }

    /// The store this client writes to.
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// The underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Sign in with email and password.
    ///
    /// Credentials are validated locally first; malformed input never
    /// reaches the provider.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthUser> {
        credentials::validate_email(email)?;
        credentials::validate_password(password)?;

        let user = self.provider.login(email, password).await?;
        self.store.set_authenticated(user.clone())?;
        info!(uid = %user.uid, "login completed");
        Ok(user)
    }

    /// Create an account and sign it in.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
        credentials::validate_email(email)?;
        credentials::validate_password(password)?;

        let user = self.provider.sign_up(email, password).await?;
        self.store.set_authenticated(user.clone())?;
        info!(uid = %user.uid, "sign-up completed");
        Ok(user)
    }

    /// Ask the provider to send a password-reset email.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        credentials::validate_email(email)?;

        self.provider.request_password_reset(email).await?;
        info!("password reset requested");
        Ok(())
    }

    /// Sign out.
    ///
    /// The provider call is best-effort: the local session is cleared even
    /// when it fails, and the failure is still returned to the caller.
    pub async fn logout(&self) -> Result<()> {
        let outcome = self.provider.logout().await;
        self.store.set_unauthenticated()?;
        if let Err(ref err) = outcome {
            warn!(%err, "provider logout failed, local session cleared anyway");
        }
        outcome
    }

    /// Token of the current session, `None` when signed out.
    pub async fn id_token(&self) -> Result<Option<String>> {
        self.provider.id_token().await
    }
}
