//! Bridges identity-provider auth reports into the session store.

use std::sync::Arc;

use tracing::{error, trace};

use crate::provider::{IdentityProvider, Subscription};
use crate::session::SessionStore;
use crate::Result;

/// Forwards every auth-state report from the provider into a
/// [`SessionStore`], in order, exactly once per report.
///
/// One synchronizer holds one subscription for its whole lifetime. The
/// subscription is released on [`stop`](SessionSynchronizer::stop) or on
/// drop, whichever comes first; releasing twice is a no-op. No retry logic
/// lives here: the provider channel handles its own transport.
pub struct SessionSynchronizer {
    subscription: Subscription,
}

impl SessionSynchronizer {
    /// Subscribe to the provider's auth-state channel and start forwarding
    /// into `store`.
    ///
    /// Failure to register leaves the store unresolved; the caller decides
    /// what to do with the error, but there is no automatic fallback to a
    /// signed-out state.
    pub fn start<P: IdentityProvider>(provider: &P, store: Arc<SessionStore>) -> Result<Self> {
        let subscription = provider.subscribe_auth_state(Box::new(move |user| {
            trace!(signed_in = user.is_some(), "auth-state report received");
            let outcome = match user {
                Some(user) => store.set_authenticated(user.clone()),
                None => store.set_unauthenticated(),
            };
            if let Err(err) = outcome {
                error!(%err, "failed to apply auth-state report");
            }
        }))?;

        Ok(Self { subscription })
    }

    /// Release the provider subscription. Safe to call more than once.
    pub fn stop(&self) {
        self.subscription.release();
    }

    /// Whether the subscription has been released.
    pub fn is_stopped(&self) -> bool {
        self.subscription.is_released()
    }
}
