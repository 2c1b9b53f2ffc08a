//! Session status storage and change notification.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};

use tracing::debug;

use super::{AuthUser, SessionStatus};
use crate::error::AuthError;
use crate::Result;

/// Identifier of a registered status observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type ObserverFn = Box<dyn Fn(&SessionStatus) + Send + Sync>;

/// Single source of truth for the authentication status.
///
/// Starts at [`SessionStatus::Unresolved`]; there is no operation that sets
/// the status back to it. Every mutation notifies all observers
/// synchronously before returning, and a second mutation cannot begin until
/// the previous notification pass has completed.
///
/// Observer callbacks must not call back into the store; they run while the
/// store's observer list is held.
pub struct SessionStore {
    status: RwLock<SessionStatus>,
    observers: Mutex<Vec<(ObserverId, ObserverFn)>>,
    next_observer: AtomicU64,
}

impl SessionStore {
    /// Create a store in the unresolved state.
    pub fn new() -> Self {
        Self {
            status: RwLock::new(SessionStatus::Unresolved),
            observers: Mutex::new(Vec::new()),
            next_observer: AtomicU64::new(1),
        }
    }

    /// Snapshot of the current status.
    pub fn status(&self) -> Result<SessionStatus> {
        let status = self.status.read().map_err(|_| AuthError::LockPoisoned)?;
        Ok(status.clone())
    }

    /// Whether an active session is present. Derived from the status on
    /// every call, never cached.
    pub fn is_authenticated(&self) -> bool {
        self.status
            .read()
            .map(|s| s.is_authenticated())
            .unwrap_or(false)
    }

    /// Whether the initial determination has completed.
    pub fn is_resolved(&self) -> bool {
        self.status.read().map(|s| s.is_resolved()).unwrap_or(false)
    }

    /// Record a confirmed session.
    ///
    /// Idempotent: an equal payload leaves the status untouched and produces
    /// no observer notification. When a local completion and the provider's
    /// echo race, last write wins; no staleness check is applied.
    pub fn set_authenticated(&self, user: AuthUser) -> Result<()> {
        self.apply(SessionStatus::Authenticated(user))
    }

    /// Record a confirmed signed-out state.
    pub fn set_unauthenticated(&self) -> Result<()> {
        self.apply(SessionStatus::Unauthenticated)
    }

    /// Register an observer invoked on every status change.
    pub fn observe<F>(&self, callback: F) -> Result<ObserverId>
    where
        F: Fn(&SessionStatus) + Send + Sync + 'static,
    {
        let id = ObserverId(self.next_observer.fetch_add(1, Ordering::Relaxed));
        let mut observers = self.observers.lock().map_err(|_| AuthError::LockPoisoned)?;
        observers.push((id, Box::new(callback)));
        Ok(id)
    }

    /// Remove a previously registered observer.
    ///
    /// Returns whether an observer with that ID was present.
    pub fn remove_observer(&self, id: ObserverId) -> Result<bool> {
        let mut observers = self.observers.lock().map_err(|_| AuthError::LockPoisoned)?;
        let before = observers.len();
        observers.retain(|(observer_id, _)| *observer_id != id);
        Ok(observers.len() < before)
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.lock().map(|o| o.len()).unwrap_or(0)
    }

    fn apply(&self, next: SessionStatus) -> Result<()> {
        // The observer list is held across mutate + notify so a concurrent
        // mutation cannot interleave its own notification pass.
        let observers = self.observers.lock().map_err(|_| AuthError::LockPoisoned)?;

        {
            let mut status = self.status.write().map_err(|_| AuthError::LockPoisoned)?;
            if *status == next {
                return Ok(());
            }
            debug!(from = ?status, to = ?next, "session status changed");
            *status = next.clone();
        }

        for (_, callback) in observers.iter() {
            callback(&next);
        }
        Ok(())
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
