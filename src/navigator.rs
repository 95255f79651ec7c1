//! Path-based routing and the hardware back-button policy.

use std::fmt;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

use crate::{log_debug, messages, Session};

fn lock_ignore_poison<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Client-visible routes. Each maps to one screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Route {
    Login,
    Register,
    ForgotPassword,
    Monitoring,
    Control,
    Charts,
    User,
}

impl Route {
    // ---
    pub const ALL: [Route; 7] = [
        Route::Login,
        Route::Register,
        Route::ForgotPassword,
        Route::Monitoring,
        Route::Control,
        Route::Charts,
        Route::User,
    ];

    pub fn path(self) -> &'static str {
        // ---
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::ForgotPassword => "/forgot-password",
            Route::Monitoring => "/monitoring",
            Route::Control => "/control",
            Route::Charts => "/charts",
            Route::User => "/user",
        }
    }

    /// Resolve a path; `/` is the login screen.
    pub fn from_path(path: &str) -> Option<Route> {
        // ---
        let path = path.trim_end_matches('/');
        if path.is_empty() {
            return Some(Route::Login);
        }
        Route::ALL.into_iter().find(|route| route.path() == path)
    }

    /// Login, register and password reset.
    pub fn is_auth_flow(self) -> bool {
        matches!(self, Route::Login | Route::Register | Route::ForgotPassword)
    }

    /// Screens that require a signed-in user.
    pub fn is_main(self) -> bool {
        !self.is_auth_flow()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// The confirmation shown instead of navigating back from a main screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExitPrompt {
    pub title: &'static str,
    pub message: &'static str,
    pub cancel_label: &'static str,
    pub confirm_label: &'static str,
}

impl Default for ExitPrompt {
    fn default() -> Self {
        Self {
            title: messages::EXIT_TITLE,
            message: messages::EXIT_MESSAGE,
            cancel_label: messages::EXIT_CANCEL,
            confirm_label: messages::EXIT_CONFIRM,
        }
    }
}

/// Outcome of a hardware back press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackPress {
    /// History was popped; the new current route.
    NavigatedBack(Route),
    /// A main screen is showing; the renderer asks before exiting.
    ConfirmExit(ExitPrompt),
    /// Nothing to go back to.
    Ignored,
}

struct History {
    stack: Vec<Route>,
    exit_requested: bool,
}

/// History stack with a sign-in guard.
///
/// Main routes are only reachable with a signed-in session; navigating to
/// one without it lands on `/login` instead.
pub struct Navigator {
    // ---
    session: Session,
    history: Mutex<History>,
}

impl Navigator {
    // ---
    /// Start on `/login`.
    pub fn new(session: Session) -> Self {
        Self {
            session,
            history: Mutex::new(History {
                stack: vec![Route::Login],
                exit_requested: false,
            }),
        }
    }

    pub fn current(&self) -> Route {
        lock_ignore_poison(&self.history)
            .stack
            .last()
            .copied()
            .unwrap_or(Route::Login)
    }

    /// Routes from oldest to current.
    pub fn history(&self) -> Vec<Route> {
        lock_ignore_poison(&self.history).stack.clone()
    }

    /// Push `route`, applying the guard. Returns the route actually shown.
    pub fn navigate(&self, route: Route) -> Route {
        // ---
        let target = if route.is_main() && !self.session.is_authenticated() {
            log_debug!("navigation to {route} redirected: not signed in");
            Route::Login
        } else {
            route
        };

        let mut history = lock_ignore_poison(&self.history);
        if history.stack.last() != Some(&target) {
            history.stack.push(target);
        }
        target
    }

    /// Resolve and navigate to a path. Unknown paths are ignored.
    pub fn navigate_path(&self, path: &str) -> Option<Route> {
        Route::from_path(path).map(|route| self.navigate(route))
    }

    /// Replace the whole history with `route`, applying the guard.
    ///
    /// Used after sign-out so that back cannot return to a main screen.
    pub fn reset_to(&self, route: Route) -> Route {
        // ---
        let target = if route.is_main() && !self.session.is_authenticated() {
            Route::Login
        } else {
            route
        };
        let mut history = lock_ignore_poison(&self.history);
        history.stack.clear();
        history.stack.push(target);
        target
    }

    /// Re-apply the guard to the current route.
    ///
    /// A main route without a signed-in session resets the history to
    /// `/login`. Returns the route now current.
    pub fn enforce_guard(&self) -> Route {
        // ---
        let current = self.current();
        if current.is_main() && !self.session.is_authenticated() {
            log_debug!("session ended on {current}, returning to login");
            return self.reset_to(Route::Login);
        }
        current
    }

    /// Pop one entry. Returns the new current route, or `None` at the bottom.
    pub fn back(&self) -> Option<Route> {
        // ---
        let mut history = lock_ignore_poison(&self.history);
        if history.stack.len() <= 1 {
            return None;
        }
        history.stack.pop();
        history.stack.last().copied()
    }

    /// Apply the back-button policy for the current route.
    pub fn handle_back_press(&self) -> BackPress {
        // ---
        if self.current().is_main() {
            return BackPress::ConfirmExit(ExitPrompt::default());
        }
        match self.back() {
            Some(route) => BackPress::NavigatedBack(route),
            None => BackPress::Ignored,
        }
    }

    /// Record that the user confirmed the exit prompt.
    pub fn request_exit(&self) {
        lock_ignore_poison(&self.history).exit_requested = true;
    }

    pub fn exit_requested(&self) -> bool {
        lock_ignore_poison(&self.history).exit_requested
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::{create_memory_auth_provider, AuthProvider};

    #[test]
    fn test_route_paths() {
        // ---
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
        assert_eq!(Route::from_path("/"), Some(Route::Login));
        assert_eq!(Route::from_path("/settings"), None);
        assert!(Route::ForgotPassword.is_auth_flow());
        assert!(Route::Charts.is_main());
    }

    #[tokio::test]
    async fn test_guard_and_back_policy() {
        // ---
        let auth = create_memory_auth_provider();
        auth.seed_account("ana@example.com", "secret1");
        let navigator = Navigator::new(Session::new(auth.clone()));

        assert_eq!(navigator.navigate(Route::Monitoring), Route::Login);
        assert_eq!(navigator.navigate(Route::Register), Route::Register);
        assert_eq!(navigator.handle_back_press(), BackPress::NavigatedBack(Route::Login));
        assert_eq!(navigator.handle_back_press(), BackPress::Ignored);

        auth.sign_in("ana@example.com", "secret1").await.unwrap();
        assert_eq!(navigator.navigate(Route::Monitoring), Route::Monitoring);
        match navigator.handle_back_press() {
            BackPress::ConfirmExit(prompt) => assert_eq!(prompt.message, "Deseja realmente sair?"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(navigator.current(), Route::Monitoring);
    }

    #[test]
    fn test_reset_to_clears_history() {
        // ---
        let navigator = Navigator::new(Session::new(create_memory_auth_provider()));
        navigator.navigate(Route::Register);
        navigator.navigate(Route::ForgotPassword);
        assert_eq!(navigator.reset_to(Route::Charts), Route::Login);
        assert_eq!(navigator.history(), vec![Route::Login]);
    }

    #[tokio::test]
    async fn test_guard_is_reapplied_after_the_session_ends() {
        // ---
        let auth = create_memory_auth_provider();
        auth.seed_account("ana@example.com", "secret1");
        auth.sign_in("ana@example.com", "secret1").await.unwrap();
        let navigator = Navigator::new(Session::new(auth.clone()));
        navigator.navigate(Route::Monitoring);
        navigator.navigate(Route::Control);
        assert_eq!(navigator.enforce_guard(), Route::Control);

        auth.sign_out().await.unwrap();

        assert_eq!(navigator.enforce_guard(), Route::Login);
        assert_eq!(navigator.history(), vec![Route::Login]);
    }
}
