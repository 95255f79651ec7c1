//! Explicit authenticated session.
//!
//! Screens never ask the auth provider for an ambient current user. They hold
//! a [`Session`], which follows the provider's watch channel.

use tokio::sync::watch;

use crate::{AuthProviderPtr, AuthUser, Error, Result};

/// The signed-in identity, refreshed from the auth provider.
///
/// `.clone()` is cheap; all clones follow the same provider.
#[derive(Clone)]
pub struct Session {
    // ---
    auth: AuthProviderPtr,
    user_rx: watch::Receiver<Option<AuthUser>>,
}

impl Session {
    // ---
    pub fn new(auth: AuthProviderPtr) -> Self {
        let user_rx = auth.watch_user();
        Self { auth, user_rx }
    }

    pub fn provider(&self) -> &AuthProviderPtr {
        &self.auth
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.user_rx.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_rx.borrow().is_some()
    }

    /// The signed-in user, or [`Error::NotAuthenticated`].
    pub fn require_user(&self) -> Result<AuthUser> {
        self.current_user().ok_or(Error::NotAuthenticated)
    }

    /// Wait for the next sign-in or sign-out and return the new state.
    ///
    /// Returns [`Error::Closed`] once the provider is gone.
    pub async fn changed(&mut self) -> Result<Option<AuthUser>> {
        // ---
        self.user_rx.changed().await.map_err(|_| Error::Closed)?;
        Ok(self.user_rx.borrow_and_update().clone())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.current_user())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::{create_memory_auth_provider, AuthProvider};
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_session_follows_provider() {
        // ---
        let auth = create_memory_auth_provider();
        auth.seed_account("ana@example.com", "secret1");
        let mut session = Session::new(auth.clone());
        assert!(matches!(session.require_user(), Err(Error::NotAuthenticated)));

        auth.sign_in("ana@example.com", "secret1").await.unwrap();
        let user = timeout(Duration::from_secs(1), session.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.map(|u| u.email), Some("ana@example.com".to_string()));
        assert!(session.is_authenticated());

        auth.sign_out().await.unwrap();
        assert!(!session.is_authenticated());
    }
}
