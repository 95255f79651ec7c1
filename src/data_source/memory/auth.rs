// src/data_source/memory/auth.rs

//! In-memory auth provider.
//!
//! Accounts live in a map keyed by e-mail. Error codes follow the hosted
//! provider the client was written against, so screens can be exercised
//! against every failure the real service reports.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use uuid::Uuid;

use crate::{
    // ---
    AuthError,
    AuthErrorCode,
    AuthProvider,
    AuthUser,
    Credential,
};

/// Minimum password length enforced by the provider.
const MIN_PASSWORD_LEN: usize = 6;

/// How long a sign-in or reauthentication counts as recent.
const DEFAULT_RECENT_LOGIN_WINDOW: Duration = Duration::from_secs(5 * 60);

struct Account {
    uid: String,
    password: String,
}

struct State {
    accounts: HashMap<String, Account>,
    current: Option<AuthUser>,
    last_login: Option<Instant>,
    reset_requests: Vec<String>,
}

fn lock_ignore_poison<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn looks_like_email(email: &str) -> bool {
    // ---
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// In-memory auth provider.
///
/// ## Semantics
///
/// - `sign_up` creates the account and leaves it signed in.
/// - `update_password` requires a sign-in or reauthentication within the
///   recent-login window, otherwise it fails with `requires-recent-login`.
/// - Every transition of the signed-in user is published on the watch
///   channel returned by `watch_user`.
pub struct MemoryAuthProvider {
    // ---
    state: Mutex<State>,
    user_tx: watch::Sender<Option<AuthUser>>,
    recent_login_window: Duration,
    latency: Mutex<Duration>,
}

impl MemoryAuthProvider {
    // ---
    fn new(recent_login_window: Duration) -> Self {
        // ---
        let (user_tx, _) = watch::channel(None);
        Self {
            state: Mutex::new(State {
                accounts: HashMap::new(),
                current: None,
                last_login: None,
                reset_requests: Vec::new(),
            }),
            user_tx,
            recent_login_window,
            latency: Mutex::new(Duration::ZERO),
        }
    }

    /// Register an account directly, without signing it in.
    ///
    /// Returns the generated uid.
    pub fn seed_account(&self, email: &str, password: &str) -> String {
        // ---
        let uid = Uuid::new_v4().to_string();
        lock_ignore_poison(&self.state).accounts.insert(
            email.to_string(),
            Account {
                uid: uid.clone(),
                password: password.to_string(),
            },
        );
        uid
    }

    /// E-mail addresses that requested a password reset, oldest first.
    pub fn reset_requests(&self) -> Vec<String> {
        lock_ignore_poison(&self.state).reset_requests.clone()
    }

    /// Forget the last login time so the next sensitive operation demands
    /// reauthentication.
    pub fn expire_recent_login(&self) {
        lock_ignore_poison(&self.state).last_login = None;
    }

    /// Hold every provider call for `delay` before it is answered.
    pub fn delay_requests(&self, delay: Duration) {
        *lock_ignore_poison(&self.latency) = delay;
    }

    async fn stall(&self) {
        let delay = *lock_ignore_poison(&self.latency);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    fn publish(&self, user: Option<AuthUser>) {
        // send_replace never fails, even with no receivers
        self.user_tx.send_replace(user);
    }
}

#[async_trait::async_trait]
impl AuthProvider for MemoryAuthProvider {
    // ---

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        // ---
        self.stall().await;
        if !looks_like_email(email) {
            return Err(AuthError::new(AuthErrorCode::InvalidEmail, email));
        }

        let user = {
            let mut state = lock_ignore_poison(&self.state);
            let account = state
                .accounts
                .get(email)
                .ok_or_else(|| AuthError::new(AuthErrorCode::UserNotFound, email))?;
            if account.password != password {
                return Err(AuthError::new(AuthErrorCode::WrongPassword, email));
            }
            let user = AuthUser {
                uid: account.uid.clone(),
                email: email.to_string(),
            };
            state.current = Some(user.clone());
            state.last_login = Some(Instant::now());
            user
        };

        crate::log_info!("memory auth: signed in {}", user.uid);
        self.publish(Some(user.clone()));
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        // ---
        self.stall().await;
        if !looks_like_email(email) {
            return Err(AuthError::new(AuthErrorCode::InvalidEmail, email));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::new(
                AuthErrorCode::WeakPassword,
                format!("password should be at least {MIN_PASSWORD_LEN} characters"),
            ));
        }

        let user = {
            let mut state = lock_ignore_poison(&self.state);
            if state.accounts.contains_key(email) {
                return Err(AuthError::new(AuthErrorCode::EmailAlreadyInUse, email));
            }
            let uid = Uuid::new_v4().to_string();
            state.accounts.insert(
                email.to_string(),
                Account {
                    uid: uid.clone(),
                    password: password.to_string(),
                },
            );
            let user = AuthUser {
                uid,
                email: email.to_string(),
            };
            state.current = Some(user.clone());
            state.last_login = Some(Instant::now());
            user
        };

        self.publish(Some(user.clone()));
        Ok(user)
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        // ---
        self.stall().await;
        if !looks_like_email(email) {
            return Err(AuthError::new(AuthErrorCode::InvalidEmail, email));
        }
        let mut state = lock_ignore_poison(&self.state);
        if !state.accounts.contains_key(email) {
            return Err(AuthError::new(AuthErrorCode::UserNotFound, email));
        }
        state.reset_requests.push(email.to_string());
        Ok(())
    }

    async fn reauthenticate(&self, credential: &Credential) -> Result<(), AuthError> {
        // ---
        self.stall().await;
        let mut state = lock_ignore_poison(&self.state);
        let current = state
            .current
            .clone()
            .ok_or_else(|| AuthError::new(AuthErrorCode::NoCurrentUser, "not signed in"))?;

        let valid = credential.email == current.email
            && state
                .accounts
                .get(&current.email)
                .is_some_and(|account| account.password == credential.password);
        if !valid {
            return Err(AuthError::new(
                AuthErrorCode::InvalidCredential,
                "credential does not match the current user",
            ));
        }

        state.last_login = Some(Instant::now());
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> Result<(), AuthError> {
        // ---
        self.stall().await;
        let mut state = lock_ignore_poison(&self.state);
        let current = state
            .current
            .clone()
            .ok_or_else(|| AuthError::new(AuthErrorCode::NoCurrentUser, "not signed in"))?;

        let recent = state
            .last_login
            .is_some_and(|at| at.elapsed() <= self.recent_login_window);
        if !recent {
            return Err(AuthError::new(
                AuthErrorCode::RequiresRecentLogin,
                "reauthenticate before changing the password",
            ));
        }
        if new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::new(
                AuthErrorCode::WeakPassword,
                format!("password should be at least {MIN_PASSWORD_LEN} characters"),
            ));
        }

        match state.accounts.get_mut(&current.email) {
            Some(account) => {
                account.password = new_password.to_string();
                Ok(())
            }
            None => Err(AuthError::new(AuthErrorCode::UserNotFound, current.email)),
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        // ---
        self.stall().await;
        {
            let mut state = lock_ignore_poison(&self.state);
            state.current = None;
            state.last_login = None;
        }
        self.publish(None);
        Ok(())
    }

    fn current_user(&self) -> Option<AuthUser> {
        lock_ignore_poison(&self.state).current.clone()
    }

    fn watch_user(&self) -> watch::Receiver<Option<AuthUser>> {
        self.user_tx.subscribe()
    }
}

/// Create a new in-memory auth provider with the default recent-login
/// window of five minutes.
pub fn create_auth_provider() -> Arc<MemoryAuthProvider> {
    Arc::new(MemoryAuthProvider::new(DEFAULT_RECENT_LOGIN_WINDOW))
}
