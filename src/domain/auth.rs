// src/domain/auth.rs

//! Authentication provider abstractions.
//!
//! Sign-in, account creation, password reset and password changes are
//! delegated entirely to an external auth service. The client only maps the
//! provider's error codes to user-facing messages and gates navigation on
//! success.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

/// The authenticated identity as reported by the provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    // ---
    pub uid: String,
    pub email: String,
}

/// Credential used for reauthentication before sensitive operations.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    // ---
    pub email: String,
    pub password: String,
}

impl Credential {
    pub fn email_password(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Provider error codes the client distinguishes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AuthErrorCode {
    UserNotFound,
    WrongPassword,
    InvalidEmail,
    WeakPassword,
    RequiresRecentLogin,
    InvalidCredential,
    EmailAlreadyInUse,
    NoCurrentUser,
    /// Any code the client has no dedicated message for.
    Other(String),
}

impl AuthErrorCode {
    // ---
    /// Parse a provider code, with or without the `auth/` prefix.
    pub fn from_provider_code(code: &str) -> Self {
        // ---
        let bare = code.strip_prefix("auth/").unwrap_or(code);
        match bare {
            "user-not-found" => Self::UserNotFound,
            "wrong-password" => Self::WrongPassword,
            "invalid-email" => Self::InvalidEmail,
            "weak-password" => Self::WeakPassword,
            "requires-recent-login" => Self::RequiresRecentLogin,
            "invalid-credential" => Self::InvalidCredential,
            "email-already-in-use" => Self::EmailAlreadyInUse,
            "no-current-user" => Self::NoCurrentUser,
            other => Self::Other(other.to_string()),
        }
    }

    /// The bare provider code.
    pub fn as_code(&self) -> &str {
        // ---
        match self {
            Self::UserNotFound => "user-not-found",
            Self::WrongPassword => "wrong-password",
            Self::InvalidEmail => "invalid-email",
            Self::WeakPassword => "weak-password",
            Self::RequiresRecentLogin => "requires-recent-login",
            Self::InvalidCredential => "invalid-credential",
            Self::EmailAlreadyInUse => "email-already-in-use",
            Self::NoCurrentUser => "no-current-user",
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "auth/{}", self.as_code())
    }
}

/// Error returned by an [`AuthProvider`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {detail}")]
pub struct AuthError {
    // ---
    pub code: AuthErrorCode,
    pub detail: String,
}

impl AuthError {
    pub fn new(code: AuthErrorCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
        }
    }

    /// Build from a raw provider code string.
    pub fn from_provider(code: &str, detail: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::from_provider_code(code), detail)
    }
}

/// Authentication provider abstraction.
///
/// Token refresh and credential storage belong to the provider. The
/// signed-in user is published on a watch channel so that sessions can follow
/// it explicitly instead of looking up ambient state.
///
/// `sign_up` follows the common provider convention of leaving the new
/// account signed in.
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    // ---
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;

    /// Confirm the current user's identity. Required shortly before
    /// [`update_password`](Self::update_password).
    async fn reauthenticate(&self, credential: &Credential) -> Result<(), AuthError>;

    async fn update_password(&self, new_password: &str) -> Result<(), AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    fn current_user(&self) -> Option<AuthUser>;

    /// Subscribe to sign-in / sign-out transitions.
    fn watch_user(&self) -> watch::Receiver<Option<AuthUser>>;
}

/// Shared auth provider pointer.
pub type AuthProviderPtr = Arc<dyn AuthProvider>;
