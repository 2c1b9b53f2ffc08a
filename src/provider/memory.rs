//! In-memory identity provider.
//!
//! A complete in-process implementation of [`IdentityProvider`]: account
//! registry, current-session tracking, auth-state listeners, and a
//! sliding-window lockout on failed logins. It is the crate's reference
//! provider and the harness that lets every flow run without a network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use tracing::debug;

use super::credentials;
use super::{AuthStateListener, IdentityProvider, Subscription};
use crate::error::AuthError;
use crate::session::{AuthUser, UserId};
use crate::Result;

/// Failed-login lockout policy.
#[derive(Debug, Clone)]
pub struct LockoutPolicy {
    /// Failures tolerated inside the window before logins are refused.
    pub max_failures: u32,
    /// Sliding window duration.
    pub window: Duration,
    /// Whether the lockout is applied at all.
    pub enabled: bool,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_failures: 5,
            window: Duration::from_secs(60),
            enabled: true,
        }
    }
}

impl LockoutPolicy {
    /// Create a disabled lockout policy.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Custom lockout threshold.
    pub fn custom(max_failures: u32, window_secs: u64) -> Self {
        Self {
            max_failures,
            window: Duration::from_secs(window_secs),
            ..Default::default()
        }
    }
}

/// A registered account.
#[derive(Debug, Clone)]
struct Account {
    uid: UserId,
    password: String,
    display_name: Option<String>,
    disabled: bool,
}

impl Account {
    fn to_user(&self, email: &str) -> AuthUser {
        AuthUser {
            uid: self.uid.clone(),
            email: Some(email.to_string()),
            display_name: self.display_name.clone(),
        }
    }
}

/// In-memory identity provider.
pub struct MemoryProvider {
    accounts: RwLock<HashMap<String, Account>>,
    current: RwLock<Option<AuthUser>>,
    listeners: Arc<Mutex<Vec<(u64, AuthStateListener)>>>,
    next_listener: AtomicU64,
    attempts: Mutex<HashMap<String, Vec<Instant>>>,
    resets: Mutex<Vec<String>>,
    lockout: LockoutPolicy,
}

impl MemoryProvider {
    /// Create an empty provider with the default lockout policy.
    pub fn new() -> Self {
        Self::with_lockout(LockoutPolicy::default())
    }

    /// Create an empty provider with a specific lockout policy.
    pub fn with_lockout(lockout: LockoutPolicy) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            current: RwLock::new(None),
            listeners: Arc::new(Mutex::new(Vec::new())),
            next_listener: AtomicU64::new(1),
            attempts: Mutex::new(HashMap::new()),
            resets: Mutex::new(Vec::new()),
            lockout,
        }
    }

    /// Seed an account without signing it in.
    pub fn register(&self, email: &str, password: &str) -> Result<UserId> {
        credentials::validate_email(email)?;
        credentials::validate_password(password)?;

        let mut accounts = self.accounts.write().map_err(|_| AuthError::LockPoisoned)?;
        if accounts.contains_key(email) {
            return Err(AuthError::EmailAlreadyInUse);
        }
        let uid = UserId::generate();
        accounts.insert(
            email.to_string(),
            Account {
                uid: uid.clone(),
                password: password.to_string(),
                display_name: None,
                disabled: false,
            },
        );
        Ok(uid)
    }

    /// Enable or disable an account.
    pub fn set_disabled(&self, email: &str, disabled: bool) -> Result<()> {
        let mut accounts = self.accounts.write().map_err(|_| AuthError::LockPoisoned)?;
        let account = accounts.get_mut(email).ok_or(AuthError::UserNotFound)?;
        account.disabled = disabled;
        Ok(())
    }

    /// The signed-in user, if any.
    pub fn current_user(&self) -> Option<AuthUser> {
        self.current.read().map(|c| c.clone()).unwrap_or(None)
    }

    /// Number of registered accounts.
    pub fn account_count(&self) -> usize {
        self.accounts.read().map(|a| a.len()).unwrap_or(0)
    }

    /// Number of live auth-state listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().map(|l| l.len()).unwrap_or(0)
    }

    /// Emails that requested a password reset, in request order.
    pub fn reset_requests(&self) -> Vec<String> {
        self.resets.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn set_current(&self, user: Option<AuthUser>) -> Result<()> {
        {
            let mut current = self.current.write().map_err(|_| AuthError::LockPoisoned)?;
            *current = user.clone();
        }
        self.notify(user.as_ref());
        Ok(())
    }

    /// Deliver a report to every listener, in subscription order. The list
    /// is held for the whole pass so reports cannot interleave.
    fn notify(&self, user: Option<&AuthUser>) {
        if let Ok(listeners) = self.listeners.lock() {
            for (_, listener) in listeners.iter() {
                listener(user);
            }
        }
    }

    fn check_lockout(&self, email: &str) -> Result<()> {
        if !self.lockout.enabled {
            return Ok(());
        }
        let mut attempts = self.attempts.lock().map_err(|_| AuthError::LockPoisoned)?;
        let Some(failures) = attempts.get_mut(email) else {
            return Ok(());
        };

        let cutoff = Instant::now() - self.lockout.window;
        failures.retain(|&t| t > cutoff);

        if failures.len() as u32 >= self.lockout.max_failures {
            let retry_after = failures
                .first()
                .map(|t| self.lockout.window.saturating_sub(t.elapsed()))
                .unwrap_or(self.lockout.window);
            return Err(AuthError::RateLimited { retry_after });
        }
        Ok(())
    }

    fn record_failure(&self, email: &str) {
        if !self.lockout.enabled {
            return;
        }
        if let Ok(mut attempts) = self.attempts.lock() {
            attempts
                .entry(email.to_string())
                .or_default()
                .push(Instant::now());
        }
    }

    fn clear_failures(&self, email: &str) {
        if let Ok(mut attempts) = self.attempts.lock() {
            attempts.remove(email);
        }
    }
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for MemoryProvider {
    async fn login(&self, email: &str, password: &str) -> Result<AuthUser> {
        self.check_lockout(email)?;

        let user = {
            let accounts = self.accounts.read().map_err(|_| AuthError::LockPoisoned)?;
            let account = match accounts.get(email) {
                Some(account) => account,
                None => {
                    drop(accounts);
                    self.record_failure(email);
                    return Err(AuthError::UserNotFound);
                }
            };
            if account.disabled {
                return Err(AuthError::UserDisabled);
            }
            if account.password != password {
                drop(accounts);
                self.record_failure(email);
                return Err(AuthError::InvalidCredentials);
            }
            account.to_user(email)
        };

        self.clear_failures(email);
        self.set_current(Some(user.clone()))?;
        debug!(uid = %user.uid, "login succeeded");
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
        // Provider-side checks mirror the client-side ones.
        credentials::validate_email(email)?;
        credentials::validate_password(password)?;

        let user = {
            let mut accounts = self.accounts.write().map_err(|_| AuthError::LockPoisoned)?;
            if accounts.contains_key(email) {
                return Err(AuthError::EmailAlreadyInUse);
            }
            let account = Account {
                uid: UserId::generate(),
                password: password.to_string(),
                display_name: None,
                disabled: false,
            };
            let user = account.to_user(email);
            accounts.insert(email.to_string(), account);
            user
        };

        self.set_current(Some(user.clone()))?;
        debug!(uid = %user.uid, "sign-up succeeded");
        Ok(user)
    }

    async fn request_password_reset(&self, email: &str) -> Result<()> {
        credentials::validate_email(email)?;
        {
            let accounts = self.accounts.read().map_err(|_| AuthError::LockPoisoned)?;
            if !accounts.contains_key(email) {
                return Err(AuthError::UserNotFound);
            }
        }
        let mut resets = self.resets.lock().map_err(|_| AuthError::LockPoisoned)?;
        resets.push(email.to_string());
        debug!("password reset recorded");
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        let had_session = {
            let mut current = self.current.write().map_err(|_| AuthError::LockPoisoned)?;
            current.take().is_some()
        };
        // No report when there was nothing to sign out.
        if had_session {
            self.notify(None);
        }
        Ok(())
    }

    async fn id_token(&self) -> Result<Option<String>> {
        let current = self.current.read().map_err(|_| AuthError::LockPoisoned)?;
        Ok(current.as_ref().map(|user| mint_token(&user.uid)))
    }

    fn subscribe_auth_state(&self, listener: AuthStateListener) -> Result<Subscription> {
        let id = self.next_listener.fetch_add(1, Ordering::Relaxed);
        let current = self
            .current
            .read()
            .map_err(|_| AuthError::LockPoisoned)?
            .clone();

        {
            let mut listeners = self.listeners.lock().map_err(|_| AuthError::LockPoisoned)?;
            // The new listener learns the current state before any later
            // report can interleave.
            listener(current.as_ref());
            listeners.push((id, listener));
        }

        let registry = Arc::clone(&self.listeners);
        Ok(Subscription::new(move || {
            if let Ok(mut listeners) = registry.lock() {
                listeners.retain(|(listener_id, _)| *listener_id != id);
            }
        }))
    }
}

/// Mint a bearer token for the signed-in user.
///
/// Format: `idt_<timestamp_hex>_<uid>`.
fn mint_token(uid: &UserId) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);

    format!("idt_{:x}_{}", timestamp as u64, uid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn test_login_success() {
        let provider = MemoryProvider::new();
        let uid = provider.register("a@b.com", "secret1").unwrap();

        let user = provider.login("a@b.com", "secret1").await.unwrap();
        assert_eq!(user.uid, uid);
        assert_eq!(user.email.as_deref(), Some("a@b.com"));
        assert_eq!(provider.current_user(), Some(user));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let provider = MemoryProvider::new();
        let result = provider.login("ghost@b.com", "secret1").await;
        assert!(matches!(result, Err(AuthError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let provider = MemoryProvider::new();
        provider.register("a@b.com", "secret1").unwrap();

        let result = provider.login("a@b.com", "wrong-1").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        assert_eq!(provider.current_user(), None);
    }

    #[tokio::test]
    async fn test_login_disabled_account() {
        let provider = MemoryProvider::new();
        provider.register("a@b.com", "secret1").unwrap();
        provider.set_disabled("a@b.com", true).unwrap();

        let result = provider.login("a@b.com", "secret1").await;
        assert!(matches!(result, Err(AuthError::UserDisabled)));

        provider.set_disabled("a@b.com", false).unwrap();
        assert!(provider.login("a@b.com", "secret1").await.is_ok());
    }

    #[tokio::test]
    async fn test_lockout_after_repeated_failures() {
        let provider = MemoryProvider::with_lockout(LockoutPolicy::custom(2, 60));
        provider.register("a@b.com", "secret1").unwrap();

        assert!(provider.login("a@b.com", "wrong-1").await.is_err());
        assert!(provider.login("a@b.com", "wrong-2").await.is_err());

        // Correct password no longer helps inside the window.
        let result = provider.login("a@b.com", "secret1").await;
        assert!(matches!(result, Err(AuthError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn test_successful_login_clears_failures() {
        let provider = MemoryProvider::with_lockout(LockoutPolicy::custom(2, 60));
        provider.register("a@b.com", "secret1").unwrap();

        assert!(provider.login("a@b.com", "wrong-1").await.is_err());
        assert!(provider.login("a@b.com", "secret1").await.is_ok());

        // The slate is clean again.
        assert!(provider.login("a@b.com", "wrong-2").await.is_err());
        assert!(provider.login("a@b.com", "secret1").await.is_ok());
    }

    #[tokio::test]
    async fn test_lockout_disabled() {
        let provider = MemoryProvider::with_lockout(LockoutPolicy::disabled());
        provider.register("a@b.com", "secret1").unwrap();

        for _ in 0..10 {
            assert!(matches!(
                provider.login("a@b.com", "wrong-1").await,
                Err(AuthError::InvalidCredentials)
            ));
        }
        assert!(provider.login("a@b.com", "secret1").await.is_ok());
    }

    #[tokio::test]
    async fn test_sign_up_creates_and_signs_in() {
        let provider = MemoryProvider::new();
        let user = provider.sign_up("new@b.com", "secret1").await.unwrap();

        assert_eq!(provider.account_count(), 1);
        assert_eq!(provider.current_user(), Some(user));
    }

    #[tokio::test]
    async fn test_sign_up_duplicate_email() {
        let provider = MemoryProvider::new();
        provider.register("a@b.com", "secret1").unwrap();

        let result = provider.sign_up("a@b.com", "other-secret").await;
        assert!(matches!(result, Err(AuthError::EmailAlreadyInUse)));
    }

    #[tokio::test]
    async fn test_sign_up_rejects_weak_password() {
        let provider = MemoryProvider::new();
        let result = provider.sign_up("a@b.com", "12345").await;
        assert!(matches!(result, Err(AuthError::WeakPassword { .. })));
        assert_eq!(provider.account_count(), 0);
    }

    #[tokio::test]
    async fn test_password_reset_recorded() {
        let provider = MemoryProvider::new();
        provider.register("a@b.com", "secret1").unwrap();

        provider.request_password_reset("a@b.com").await.unwrap();
        provider.request_password_reset("a@b.com").await.unwrap();
        assert_eq!(provider.reset_requests(), vec!["a@b.com", "a@b.com"]);
    }

    #[tokio::test]
    async fn test_password_reset_unknown_user() {
        let provider = MemoryProvider::new();
        let result = provider.request_password_reset("ghost@b.com").await;
        assert!(matches!(result, Err(AuthError::UserNotFound)));
        assert!(provider.reset_requests().is_empty());
    }

    #[tokio::test]
    async fn test_password_reset_invalid_email() {
        let provider = MemoryProvider::new();
        let result = provider.request_password_reset("not-an-email").await;
        assert!(matches!(result, Err(AuthError::InvalidEmail(_))));
    }

    #[tokio::test]
    async fn test_subscribe_reports_current_state_immediately() {
        let provider = MemoryProvider::new();
        let reports: Arc<Mutex<Vec<Option<AuthUser>>>> = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&reports);
        let _subscription = provider
            .subscribe_auth_state(Box::new(move |user| {
                sink.lock().unwrap().push(user.cloned());
            }))
            .unwrap();

        // Signed out at subscription time.
        assert_eq!(*reports.lock().unwrap(), vec![None]);

        provider.register("a@b.com", "secret1").unwrap();
        let user = provider.login("a@b.com", "secret1").await.unwrap();
        assert_eq!(*reports.lock().unwrap(), vec![None, Some(user)]);
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_reports() {
        let provider = MemoryProvider::new();
        let reports = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&reports);
        let subscription = provider
            .subscribe_auth_state(Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();
        assert_eq!(provider.listener_count(), 1);
        assert_eq!(reports.load(Ordering::SeqCst), 1);

        subscription.release();
        assert_eq!(provider.listener_count(), 0);

        provider.register("a@b.com", "secret1").unwrap();
        provider.login("a@b.com", "secret1").await.unwrap();
        assert_eq!(reports.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_logout_emits_single_report() {
        let provider = MemoryProvider::new();
        provider.register("a@b.com", "secret1").unwrap();
        provider.login("a@b.com", "secret1").await.unwrap();

        let reports: Arc<Mutex<Vec<bool>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reports);
        let _subscription = provider
            .subscribe_auth_state(Box::new(move |user| {
                sink.lock().unwrap().push(user.is_some());
            }))
            .unwrap();

        provider.logout().await.unwrap();
        // Second logout has nothing to report.
        provider.logout().await.unwrap();

        assert_eq!(*reports.lock().unwrap(), vec![true, false]);
        assert_eq!(provider.current_user(), None);
    }

    #[test]
    fn test_id_token_follows_session() {
        let provider = MemoryProvider::new();
        provider.register("a@b.com", "secret1").unwrap();

        tokio_test::block_on(async {
            assert_eq!(provider.id_token().await.unwrap(), None);

            provider.login("a@b.com", "secret1").await.unwrap();
            let token = provider.id_token().await.unwrap().unwrap();
            assert!(token.starts_with("idt_"));
            assert!(token.ends_with(provider.current_user().unwrap().uid.as_str()));

            provider.logout().await.unwrap();
            assert_eq!(provider.id_token().await.unwrap(), None);
        });
    }
}
