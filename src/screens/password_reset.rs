//! Password recovery screen.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde::Serialize;

use super::lifecycle::{BusyFlag, Lifecycle};
use super::{AppContext, Screen};
use crate::messages::{self, auth_message, AuthFlow};
use crate::{log_warn, Notice, Result, Route, ValidationError};

fn lock_ignore_poison<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PasswordResetForm {
    pub email: String,
}

#[derive(Clone)]
pub struct PasswordResetScreen {
    inner: Arc<Inner>,
}

struct Inner {
    ctx: AppContext,
    form: Mutex<PasswordResetForm>,
    busy: BusyFlag,
    lifecycle: Lifecycle,
}

impl PasswordResetScreen {
    // ---
    pub fn new(ctx: AppContext) -> Self {
        Self {
            inner: Arc::new(Inner {
                ctx,
                form: Mutex::new(PasswordResetForm::default()),
                busy: BusyFlag::default(),
                lifecycle: Lifecycle::default(),
            }),
        }
    }

    pub fn form(&self) -> PasswordResetForm {
        lock_ignore_poison(&self.inner.form).clone()
    }

    pub fn is_busy(&self) -> bool {
        self.inner.busy.is_busy()
    }

    pub fn set_email(&self, email: impl Into<String>) {
        lock_ignore_poison(&self.inner.form).email = email.into();
    }

    /// Ask the provider to e-mail a reset link, then return to login.
    pub async fn submit(&self) -> Result<()> {
        // ---
        let _busy = self.inner.busy.try_begin()?;
        let ctx = &self.inner.ctx;
        let email = self.form().email.trim().to_string();

        if email.is_empty() {
            ctx.notify(Notice::error(messages::ENTER_VALID_EMAIL));
            return Err(ValidationError::EmptyField("email").into());
        }

        match ctx.auth_call(ctx.auth.send_password_reset(&email)).await {
            Ok(()) => {
                ctx.notify(Notice::success(messages::RESET_EMAIL_SENT));
                if self.inner.lifecycle.is_alive() {
                    ctx.navigator.navigate(Route::Login);
                }
                Ok(())
            }
            Err(err) => {
                log_warn!("password reset failed: {err}");
                ctx.notify(Notice::error(auth_message(AuthFlow::PasswordReset, &err.code)));
                Err(err.into())
            }
        }
    }
}

#[async_trait]
impl Screen for PasswordResetScreen {
    fn route(&self) -> Route {
        Route::ForgotPassword
    }

    async fn mount(&self) -> Result<()> {
        self.inner.lifecycle.revive();
        Ok(())
    }

    async fn unmount(&self) {
        self.inner.lifecycle.shutdown().await;
    }
}
