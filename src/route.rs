//! Top-level flow selection from the session status.

use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::session::{ObserverId, SessionStatus, SessionStore};
use crate::Result;

/// Which top-level UI flow is mounted.
///
/// Exactly one flow is mounted at any time; `Loading` mounts nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteState {
    /// Status is unresolved; render nothing (splash).
    #[default]
    Loading,
    /// Pre-auth flow: onboarding, login, sign-up, password reset.
    Unauthenticated,
    /// Post-auth flow.
    Authenticated,
}

impl RouteState {
    /// The flow a given status mounts. Total over all variants.
    pub fn for_status(status: &SessionStatus) -> Self {
        match status {
            SessionStatus::Unresolved => RouteState::Loading,
            SessionStatus::Unauthenticated => RouteState::Unauthenticated,
            SessionStatus::Authenticated(_) => RouteState::Authenticated,
        }
    }

    /// Whether nothing is mounted yet.
    pub fn is_loading(&self) -> bool {
        matches!(self, RouteState::Loading)
    }
}

/// Tracks the mounted flow and suppresses same-state remounts.
///
/// Transitions are unconditional and immediate; there is no debounce. The
/// comparison is on the top-level state, not the full status, so a changed
/// session payload inside `Authenticated` does not remount the flow.
#[derive(Debug, Default)]
pub struct RouteGate {
    current: RouteState,
    remounts: u64,
}

impl RouteGate {
    /// Create a gate in the loading state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently mounted flow.
    pub fn current(&self) -> RouteState {
        self.current
    }

    /// How many times a flow has been (re)mounted.
    pub fn remounts(&self) -> u64 {
        self.remounts
    }

    /// Apply a status change.
    ///
    /// Returns `Some(state)` when the mounted flow changes, `None` when the
    /// status maps to the flow already mounted.
    pub fn observe(&mut self, status: &SessionStatus) -> Option<RouteState> {
        let next = RouteState::for_status(status);
        if next == self.current {
            return None;
        }
        self.current = next;
        self.remounts += 1;
        Some(next)
    }
}

/// A [`RouteGate`] wired to a [`SessionStore`].
///
/// Catches up on the store's current status at attach time, then follows
/// every change. Detaches its observer on drop.
pub struct GateHandle {
    gate: Arc<Mutex<RouteGate>>,
    store: Arc<SessionStore>,
    observer: ObserverId,
}

impl GateHandle {
    /// Attach a new gate to the store.
    pub fn attach(store: Arc<SessionStore>) -> Result<Self> {
        let gate = Arc::new(Mutex::new(RouteGate::new()));

        {
            let status = store.status()?;
            if let Ok(mut gate) = gate.lock() {
                gate.observe(&status);
            }
        }

        let observer = {
            let gate = Arc::clone(&gate);
            store.observe(move |status| {
                if let Ok(mut gate) = gate.lock() {
                    if let Some(state) = gate.observe(status) {
                        debug!(?state, "route flow changed");
                    }
                }
            })?
        };

        Ok(Self {
            gate,
            store,
            observer,
        })
    }

    /// The currently mounted flow.
    pub fn current(&self) -> RouteState {
        self.gate.lock().map(|gate| gate.current()).unwrap_or_default()
    }

    /// How many times a flow has been (re)mounted.
    pub fn remounts(&self) -> u64 {
        self.gate.lock().map(|gate| gate.remounts()).unwrap_or(0)
    }
}

impl Drop for GateHandle {
    fn drop(&mut self) {
        let _ = self.store.remove_observer(self.observer);
    }
}
