//! Account screen: profile name, password change and sign-out.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::lifecycle::{BusyFlag, Lifecycle};
use super::{AppContext, Screen};
use crate::messages::{self, auth_message, AuthFlow};
use crate::{
    // ---
    log_info,
    log_warn,
    AuthError,
    Credential,
    Error,
    Notice,
    NoticeKind,
    Result,
    Route,
    ValidationError,
};

fn lock_ignore_poison<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PasswordChangeForm {
    pub visible: bool,
    pub new_password: String,
    pub current_password: String,
}

#[derive(Debug, Clone, Default)]
struct State {
    name: Option<String>,
    email: Option<String>,
    password: PasswordChangeForm,
}

#[derive(Clone)]
pub struct UserScreen {
    inner: Arc<Inner>,
}

struct Inner {
    ctx: AppContext,
    state: Mutex<State>,
    busy: BusyFlag,
    lifecycle: Lifecycle,
}

impl UserScreen {
    // ---
    pub fn new(ctx: AppContext) -> Self {
        Self {
            inner: Arc::new(Inner {
                ctx,
                state: Mutex::new(State::default()),
                busy: BusyFlag::default(),
                lifecycle: Lifecycle::default(),
            }),
        }
    }

    /// Profile name; `None` until [`load_profile`](Self::load_profile) ran.
    pub fn name(&self) -> Option<String> {
        lock_ignore_poison(&self.inner.state).name.clone()
    }

    pub fn email(&self) -> Option<String> {
        lock_ignore_poison(&self.inner.state).email.clone()
    }

    pub fn password_form(&self) -> PasswordChangeForm {
        lock_ignore_poison(&self.inner.state).password.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.inner.busy.is_busy()
    }

    pub fn toggle_password_form(&self) {
        let mut state = lock_ignore_poison(&self.inner.state);
        state.password.visible = !state.password.visible;
    }

    pub fn set_new_password(&self, password: impl Into<String>) {
        lock_ignore_poison(&self.inner.state).password.new_password = password.into();
    }

    pub fn set_current_password(&self, password: impl Into<String>) {
        lock_ignore_poison(&self.inner.state).password.current_password = password.into();
    }

    /// Read `users/{uid}` and show its `name`.
    ///
    /// A missing record or name shows `Usuário`; a failed read shows
    /// `Erro ao carregar`.
    pub async fn load_profile(&self) -> Result<String> {
        // ---
        let ctx = &self.inner.ctx;
        let user = ctx.session.require_user()?;
        let path = ctx.config.paths.user(&user.uid);

        let (name, result) = match ctx.read(&path).await {
            Ok(record) => {
                let name = record
                    .as_ref()
                    .and_then(|record| record.get("name"))
                    .and_then(Value::as_str)
                    .filter(|name| !name.is_empty())
                    .unwrap_or(messages::DEFAULT_USER_NAME)
                    .to_string();
                (name.clone(), Ok(name))
            }
            Err(err) => {
                log_warn!("loading profile of {} failed: {err}", user.uid);
                (messages::USER_NAME_LOAD_FAILED.to_string(), Err(err))
            }
        };

        if self.inner.lifecycle.is_alive() {
            let mut state = lock_ignore_poison(&self.inner.state);
            state.name = Some(name);
            state.email = Some(user.email);
        }
        result
    }

    /// Validate, reauthenticate with the current password, then update.
    pub async fn change_password(&self) -> Result<()> {
        // ---
        let _busy = self.inner.busy.try_begin()?;
        let ctx = &self.inner.ctx;
        let form = self.password_form();
        let min = ctx.config.min_password_len;

        if form.new_password.chars().count() < min {
            ctx.notify(Notice::error(messages::NEW_PASSWORD_TOO_SHORT));
            return Err(ValidationError::PasswordTooShort { min }.into());
        }
        if form.current_password.is_empty() {
            ctx.notify(Notice::error(messages::CURRENT_PASSWORD_REQUIRED));
            return Err(ValidationError::EmptyField("current_password").into());
        }

        let user = match ctx.session.require_user() {
            Ok(user) => user,
            Err(err) => {
                ctx.notify(Notice::error(messages::SESSION_EXPIRED));
                return Err(err);
            }
        };

        let credential = Credential::email_password(user.email, form.current_password);
        let changed: std::result::Result<(), AuthError> = async {
            ctx.auth_call(ctx.auth.reauthenticate(&credential)).await?;
            ctx.auth_call(ctx.auth.update_password(&form.new_password)).await
        }
        .await;

        match changed {
            Ok(()) => {
                log_info!("password updated for {}", user.uid);
                ctx.notify(Notice::success(messages::PASSWORD_UPDATED));
                if self.inner.lifecycle.is_alive() {
                    lock_ignore_poison(&self.inner.state).password = PasswordChangeForm::default();
                }
                Ok(())
            }
            Err(err) => {
                log_warn!("password change failed: {err}");
                ctx.notify(Notice::error(auth_message(AuthFlow::PasswordChange, &err.code)));
                Err(Error::Auth(err))
            }
        }
    }

    /// Sign out and return to `/login` with a fresh history.
    pub async fn sign_out(&self) -> Result<()> {
        // ---
        let _busy = self.inner.busy.try_begin()?;
        let ctx = &self.inner.ctx;

        match ctx.auth_call(ctx.auth.sign_out()).await {
            Ok(()) => {
                ctx.notify(Notice {
                    kind: NoticeKind::Info,
                    title: messages::TITLE_LOGOUT.to_string(),
                    message: messages::SIGNED_OUT.to_string(),
                });
                if self.inner.lifecycle.is_alive() {
                    ctx.navigator.reset_to(Route::Login);
                }
                Ok(())
            }
            Err(err) => {
                log_warn!("sign-out failed: {err}");
                ctx.notify(Notice::error(auth_message(AuthFlow::SignOut, &err.code)));
                Err(err.into())
            }
        }
    }
}

#[async_trait]
impl Screen for UserScreen {
    fn route(&self) -> Route {
        Route::User
    }

    /// Load the profile. A failed read is shown in place of the name and
    /// does not fail the mount.
    async fn mount(&self) -> Result<()> {
        // ---
        self.inner.lifecycle.revive();
        match self.load_profile().await {
            Ok(_) | Err(Error::Read(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }

    async fn unmount(&self) {
        self.inner.lifecycle.shutdown().await;
    }
}
