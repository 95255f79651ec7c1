//! Login screen.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde::Serialize;

use super::lifecycle::{BusyFlag, Lifecycle};
use super::{AppContext, Screen};
use crate::messages::{self, auth_message, AuthFlow};
use crate::{log_info, log_warn, AuthUser, Notice, Result, Route, ValidationError};

fn lock_ignore_poison<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub show_password: bool,
}

/// E-mail and password sign-in.
///
/// Cheap to clone (internally `Arc`-backed).
#[derive(Clone)]
pub struct LoginScreen {
    inner: Arc<Inner>,
}

struct Inner {
    ctx: AppContext,
    form: Mutex<LoginForm>,
    busy: BusyFlag,
    lifecycle: Lifecycle,
}

impl LoginScreen {
    // ---
    pub fn new(ctx: AppContext) -> Self {
        Self {
            inner: Arc::new(Inner {
                ctx,
                form: Mutex::new(LoginForm::default()),
                busy: BusyFlag::default(),
                lifecycle: Lifecycle::default(),
            }),
        }
    }

    pub fn form(&self) -> LoginForm {
        lock_ignore_poison(&self.inner.form).clone()
    }

    pub fn is_busy(&self) -> bool {
        self.inner.busy.is_busy()
    }

    pub fn set_email(&self, email: impl Into<String>) {
        lock_ignore_poison(&self.inner.form).email = email.into();
    }

    pub fn set_password(&self, password: impl Into<String>) {
        lock_ignore_poison(&self.inner.form).password = password.into();
    }

    pub fn toggle_password_visibility(&self) {
        let mut form = lock_ignore_poison(&self.inner.form);
        form.show_password = !form.show_password;
    }

    pub fn go_to_register(&self) -> Route {
        self.inner.ctx.navigator.navigate(Route::Register)
    }

    pub fn go_to_forgot_password(&self) -> Route {
        self.inner.ctx.navigator.navigate(Route::ForgotPassword)
    }

    /// Sign in with the form contents and open the monitoring screen.
    ///
    /// On failure the mapped message is shown and the route is unchanged.
    pub async fn submit(&self) -> Result<AuthUser> {
        // ---
        let _busy = self.inner.busy.try_begin()?;
        let ctx = &self.inner.ctx;
        let form = self.form();
        let email = form.email.trim();

        if email.is_empty() || form.password.is_empty() {
            ctx.notify(Notice::error(messages::FILL_ALL_FIELDS));
            let field = if email.is_empty() { "email" } else { "password" };
            return Err(ValidationError::EmptyField(field).into());
        }

        match ctx.auth_call(ctx.auth.sign_in(email, &form.password)).await {
            Ok(user) => {
                log_info!("signed in {}", user.uid);
                ctx.notify(Notice::success(messages::LOGIN_SUCCESS));
                if self.inner.lifecycle.is_alive() {
                    lock_ignore_poison(&self.inner.form).password.clear();
                    ctx.navigator.navigate(Route::Monitoring);
                }
                Ok(user)
            }
            Err(err) => {
                log_warn!("sign-in failed: {err}");
                ctx.notify(Notice::error(auth_message(AuthFlow::SignIn, &err.code)));
                Err(err.into())
            }
        }
    }
}

#[async_trait]
impl Screen for LoginScreen {
    fn route(&self) -> Route {
        Route::Login
    }

    async fn mount(&self) -> Result<()> {
        self.inner.lifecycle.revive();
        Ok(())
    }

    async fn unmount(&self) {
        self.inner.lifecycle.shutdown().await;
    }
}
