//! Headless screen controllers.
//!
//! Each controller owns the state one screen renders and the actions its
//! controls trigger. Renderers read state through the controller's accessor
//! methods and never touch the backend themselves.
//!
//! ## Lifecycle
//!
//! - `mount` establishes the screen's subscriptions.
//! - `unmount` stops them. After it returns no subscription callback runs and
//!   results of in-flight calls are dropped instead of applied.
//! - Actions are rejected with [`Error::Busy`](crate::Error::Busy) while the
//!   same action is in flight. Nothing is retried automatically.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time;

use crate::feed::{spawn_feed, ChangeConsumer, FeedHandle};
use crate::{
    // ---
    AppendKey,
    AuthError,
    AuthErrorCode,
    AuthProviderPtr,
    ClientConfig,
    DataPath,
    DataSourcePtr,
    Error,
    Navigator,
    Notice,
    NotifierPtr,
    Result,
    Route,
    Session,
};

mod board;
mod charts;
mod control;
mod lifecycle;
mod login;
mod monitoring;
mod password_reset;
mod register;
mod user;

pub use board::ChannelReading;
pub use charts::{ChartsScreen, ChartsView};
pub use control::{ControlForm, ControlScreen};
pub use login::{LoginForm, LoginScreen};
pub use monitoring::{MonitoringScreen, MonitoringView};
pub use password_reset::{PasswordResetForm, PasswordResetScreen};
pub use register::{RegisterForm, RegisterScreen};
pub use user::{PasswordChangeForm, UserScreen};

/// A mountable screen.
#[async_trait]
pub trait Screen: Send + Sync {
    fn route(&self) -> Route;

    /// Establish subscriptions. Screens without any return immediately.
    async fn mount(&self) -> Result<()>;

    /// Release every subscription.
    async fn unmount(&self);
}

/// Collaborators shared by every controller.
///
/// `.clone()` is cheap; all fields are shared handles.
#[derive(Clone)]
pub struct AppContext {
    // ---
    pub data: DataSourcePtr,
    pub auth: AuthProviderPtr,
    pub session: Session,
    pub navigator: Arc<Navigator>,
    pub notifier: NotifierPtr,
    pub config: Arc<ClientConfig>,
}

impl AppContext {
    // ---
    pub fn new(data: DataSourcePtr, auth: AuthProviderPtr, notifier: NotifierPtr, config: ClientConfig) -> Self {
        // ---
        let session = Session::new(auth.clone());
        let navigator = Arc::new(Navigator::new(session.clone()));
        Self {
            data,
            auth,
            session,
            navigator,
            notifier,
            config: Arc::new(config),
        }
    }

    pub fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }

    /// Read bounded by the request timeout.
    pub(crate) async fn read(&self, path: &DataPath) -> Result<Option<Value>> {
        match time::timeout(self.config.request_timeout, self.data.read(path)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Read(format!("timed out reading {path}"))),
        }
    }

    /// Write bounded by the request timeout.
    pub(crate) async fn write(&self, path: &DataPath, value: Value) -> Result<()> {
        match time::timeout(self.config.request_timeout, self.data.write(path, value)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Write(format!("timed out writing {path}"))),
        }
    }

    /// Append bounded by the request timeout.
    pub(crate) async fn append(&self, path: &DataPath, value: Value) -> Result<AppendKey> {
        match time::timeout(self.config.request_timeout, self.data.append(path, value)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Write(format!("timed out appending to {path}"))),
        }
    }

    /// Subscribe `consumer` to `path`, bounded by the request timeout.
    pub(crate) async fn feed<C>(&self, path: DataPath, consumer: Arc<C>) -> Result<FeedHandle>
    where
        C: ChangeConsumer + 'static,
    {
        // ---
        let label = path.clone();
        match time::timeout(
            self.config.request_timeout,
            spawn_feed(self.data.clone(), path, consumer),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(Error::Read(format!("timed out subscribing to {label}"))),
        }
    }

    /// Auth call bounded by the request timeout.
    ///
    /// Expiry is reported as a `network-request-failed` provider error.
    pub(crate) async fn auth_call<T, F>(&self, call: F) -> std::result::Result<T, AuthError>
    where
        F: Future<Output = std::result::Result<T, AuthError>>,
    {
        match time::timeout(self.config.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(AuthError::new(
                AuthErrorCode::Other("network-request-failed".into()),
                "auth request timed out",
            )),
        }
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("session", &self.session)
            .field("route", &self.navigator.current())
            .finish_non_exhaustive()
    }
}
