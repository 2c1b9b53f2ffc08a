//! # session-gate
//!
//! Client-side authentication session core.
//!
//! This crate tracks whether a user is signed in, bridges an external
//! identity provider's push notifications into a single session store, and
//! gates which top-level UI flow is mounted. The provider itself is a
//! black box behind the [`IdentityProvider`] trait; [`MemoryProvider`] is
//! the in-process reference implementation.
//!
//! ## Features
//!
//! - **Session Store**: single source of truth for the auth status, with
//!   synchronous observer notification and idempotent writes
//! - **Session Synchronizer**: one provider subscription for the process
//!   lifetime, forwarding every report in order
//! - **Route Gate**: loading / pre-auth / post-auth flow selection with
//!   same-state remount suppression
//! - **Auth flows**: login, sign-up, password reset, and logout with local
//!   credential validation
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use session_gate::{
//!     AuthClient, GateHandle, MemoryProvider, RouteState, SessionStore, SessionSynchronizer,
//! };
//!
//! #[tokio::main]
//! async fn main() -> session_gate::Result<()> {
//!     // Initialize logging
//!     session_gate::logging::try_init().ok();
//!
//!     // The store everything reads from, and the gate that follows it
//!     let store = Arc::new(SessionStore::new());
//!     let gate = GateHandle::attach(Arc::clone(&store))?;
//!
//!     // Bridge the provider's reports into the store
//!     let provider = MemoryProvider::new();
//!     provider.register("a@b.com", "secret1")?;
//!     let _sync = SessionSynchronizer::start(&provider, Arc::clone(&store))?;
//!     assert_eq!(gate.current(), RouteState::Unauthenticated);
//!
//!     // Sign in; the gate flips to the post-auth flow
//!     let client = AuthClient::new(provider, Arc::clone(&store));
//!     client.login("a@b.com", "secret1").await?;
//!     assert_eq!(gate.current(), RouteState::Authenticated);
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod provider;
pub mod route;
pub mod session;
pub mod sync;

// Re-export commonly used types
pub use client::AuthClient;
pub use config::Config;
pub use error::{AuthError, Result};
pub use provider::{
    AuthStateListener, IdentityProvider, LockoutPolicy, MemoryProvider, Subscription,
};
pub use route::{GateHandle, RouteGate, RouteState};
pub use session::{AuthUser, ObserverId, SessionStatus, SessionStore, UserId};
pub use sync::SessionSynchronizer;
