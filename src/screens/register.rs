//! Account registration screen.

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
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    /// Inline error under the confirmation field.
    pub mismatch_error: Option<&'static str>,
    /// Message of the last failed submit.
    pub submit_error: Option<String>,
}

impl RegisterForm {
    fn refresh_mismatch(&mut self) {
        self.mismatch_error = (!self.confirm_password.is_empty() && self.confirm_password != self.password)
            .then_some(messages::PASSWORDS_DO_NOT_MATCH);
    }
}

/// Creates an account, then returns to login.
#[derive(Clone)]
pub struct RegisterScreen {
    inner: Arc<Inner>,
}

struct Inner {
    ctx: AppContext,
    form: Mutex<RegisterForm>,
    busy: BusyFlag,
    lifecycle: Lifecycle,
}

impl RegisterScreen {
    // ---
    pub fn new(ctx: AppContext) -> Self {
        Self {
            inner: Arc::new(Inner {
                ctx,
                form: Mutex::new(RegisterForm::default()),
                busy: BusyFlag::default(),
                lifecycle: Lifecycle::default(),
            }),
        }
    }

    pub fn form(&self) -> RegisterForm {
        lock_ignore_poison(&self.inner.form).clone()
    }

    pub fn is_busy(&self) -> bool {
        self.inner.busy.is_busy()
    }

    pub fn set_email(&self, email: impl Into<String>) {
        lock_ignore_poison(&self.inner.form).email = email.into();
    }

    pub fn set_password(&self, password: impl Into<String>) {
        let mut form = lock_ignore_poison(&self.inner.form);
        form.password = password.into();
        form.refresh_mismatch();
    }

    pub fn set_confirm_password(&self, confirm: impl Into<String>) {
        let mut form = lock_ignore_poison(&self.inner.form);
        form.confirm_password = confirm.into();
        form.refresh_mismatch();
    }

    /// False while a field is empty, the passwords differ, or a submit is running.
    pub fn can_submit(&self) -> bool {
        // ---
        let form = self.form();
        !self.is_busy()
            && !form.email.trim().is_empty()
            && !form.password.is_empty()
            && form.password == form.confirm_password
    }

    pub async fn submit(&self) -> Result<AuthUser> {
        // ---
        let _busy = self.inner.busy.try_begin()?;
        let ctx = &self.inner.ctx;
        let form = self.form();
        let email = form.email.trim();

        if email.is_empty() || form.password.is_empty() {
            lock_ignore_poison(&self.inner.form).submit_error = Some(messages::FILL_ALL_FIELDS.into());
            let field = if email.is_empty() { "email" } else { "password" };
            return Err(ValidationError::EmptyField(field).into());
        }
        if form.password != form.confirm_password {
            lock_ignore_poison(&self.inner.form).mismatch_error = Some(messages::PASSWORDS_DO_NOT_MATCH);
            return Err(ValidationError::PasswordMismatch.into());
        }

        lock_ignore_poison(&self.inner.form).submit_error = None;
        match ctx.auth_call(ctx.auth.sign_up(email, &form.password)).await {
            Ok(user) => {
                log_info!("registered {}", user.uid);
                ctx.notify(Notice::success(messages::SIGN_UP_SUCCESS));
                if self.inner.lifecycle.is_alive() {
                    ctx.navigator.navigate(Route::Login);
                }
                Ok(user)
            }
            Err(err) => {
                log_warn!("sign-up failed: {err}");
                let message = auth_message(AuthFlow::SignUp, &err.code);
                ctx.notify(Notice::error(message));
                if self.inner.lifecycle.is_alive() {
                    lock_ignore_poison(&self.inner.form).submit_error = Some(message.into());
                }
                Err(err.into())
            }
        }
    }
}

#[async_trait]
impl Screen for RegisterScreen {
    fn route(&self) -> Route {
        Route::Register
    }

    async fn mount(&self) -> Result<()> {
        self.inner.lifecycle.revive();
        Ok(())
    }

    async fn unmount(&self) {
        self.inner.lifecycle.shutdown().await;
    }
}
