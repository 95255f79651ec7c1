//! Application shell.
//!
//! [`AppBuilder`] wires a data source and an auth provider into an
//! [`AppContext`]; [`App`] keeps exactly one screen mounted and follows
//! the navigator.
//!
//! When the session ends while a main screen is mounted, by whatever means,
//! the history resets to `/login` and the main screen is unmounted.
//!
//! # Example
//!
//! ```no_run
//! use bioreactor_client::{create_memory_auth_provider, create_memory_data_source, AppBuilder, Route};
//! use std::time::Duration;
//!
//! # async fn example() -> bioreactor_client::Result<()> {
//! let app = AppBuilder::new(create_memory_data_source(), create_memory_auth_provider())
//!     .request_timeout(Duration::from_secs(10))
//!     .build();
//!
//! let screen = app.open(Route::Monitoring).await?;
//! assert_eq!(screen.route(), Route::Login);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::screens::{
    // ---
    AppContext,
    ChartsScreen,
    ControlScreen,
    LoginScreen,
    MonitoringScreen,
    PasswordResetScreen,
    RegisterScreen,
    Screen,
    UserScreen,
};
use crate::{
    // ---
    log_debug,
    log_error,
    log_warn,
    AuthProviderPtr,
    BackPress,
    ClientConfig,
    DataPaths,
    DataSourcePtr,
    LogNotifier,
    NotifierPtr,
    Result,
    Route,
};

/// Builder for [`App`].
pub struct AppBuilder {
    // ---
    data: DataSourcePtr,
    auth: AuthProviderPtr,
    notifier: Option<NotifierPtr>,
    config: ClientConfig,
}

impl AppBuilder {
    // ---
    pub fn new(data: DataSourcePtr, auth: AuthProviderPtr) -> Self {
        Self {
            data,
            auth,
            notifier: None,
            config: ClientConfig::default(),
        }
    }

    /// Where notices go.
    ///
    /// Default: the log.
    pub fn notifier(mut self, notifier: NotifierPtr) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Default: 30s.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Default: unprefixed paths.
    pub fn paths(mut self, paths: DataPaths) -> Self {
        self.config.paths = paths;
        self
    }

    pub fn context(self) -> AppContext {
        // ---
        let notifier = self
            .notifier
            .unwrap_or_else(|| Arc::new(LogNotifier));
        AppContext::new(self.data, self.auth, notifier, self.config)
    }

    /// Build the app (consumes self). No screen is mounted yet.
    ///
    /// Inside a tokio runtime this also starts following the session.
    /// Outside one, session changes are only applied by [`App::sync`].
    pub fn build(self) -> App {
        // ---
        let shell = Arc::new(Shell {
            ctx: self.context(),
            active: Mutex::new(None),
        });
        let watcher = match Handle::try_current() {
            Ok(runtime) => Some(runtime.spawn(follow_session(shell.clone()))),
            Err(_) => {
                log_warn!("no tokio runtime: session changes apply on sync() only");
                None
            }
        };
        App { shell, watcher }
    }
}

/// The mounted screen. Each route maps to one controller.
#[derive(Clone)]
pub enum ActiveScreen {
    Login(LoginScreen),
    Register(RegisterScreen),
    ForgotPassword(PasswordResetScreen),
    Monitoring(MonitoringScreen),
    Control(ControlScreen),
    Charts(ChartsScreen),
    User(UserScreen),
}

impl ActiveScreen {
    // ---
    fn for_route(route: Route, ctx: &AppContext) -> Self {
        // ---
        let ctx = ctx.clone();
        match route {
            Route::Login => ActiveScreen::Login(LoginScreen::new(ctx)),
            Route::Register => ActiveScreen::Register(RegisterScreen::new(ctx)),
            Route::ForgotPassword => ActiveScreen::ForgotPassword(PasswordResetScreen::new(ctx)),
            Route::Monitoring => ActiveScreen::Monitoring(MonitoringScreen::new(ctx)),
            Route::Control => ActiveScreen::Control(ControlScreen::new(ctx)),
            Route::Charts => ActiveScreen::Charts(ChartsScreen::new(ctx)),
            Route::User => ActiveScreen::User(UserScreen::new(ctx)),
        }
    }

    pub fn as_screen(&self) -> &dyn Screen {
        // ---
        match self {
            ActiveScreen::Login(screen) => screen,
            ActiveScreen::Register(screen) => screen,
            ActiveScreen::ForgotPassword(screen) => screen,
            ActiveScreen::Monitoring(screen) => screen,
            ActiveScreen::Control(screen) => screen,
            ActiveScreen::Charts(screen) => screen,
            ActiveScreen::User(screen) => screen,
        }
    }

    pub fn route(&self) -> Route {
        self.as_screen().route()
    }
}

/// Keeps one screen mounted, in step with the navigator and the session.
pub struct App {
    shell: Arc<Shell>,
    watcher: Option<JoinHandle<()>>,
}

struct Shell {
    ctx: AppContext,
    active: Mutex<Option<ActiveScreen>>,
}

impl App {
    // ---
    pub fn context(&self) -> &AppContext {
        &self.shell.ctx
    }

    pub async fn active(&self) -> Option<ActiveScreen> {
        self.shell.active.lock().await.clone()
    }

    /// Navigate to `route` (subject to the sign-in guard) and show it.
    pub async fn open(&self, route: Route) -> Result<ActiveScreen> {
        let target = self.shell.ctx.navigator.navigate(route);
        self.shell.show(target).await
    }

    /// Re-check the sign-in guard, then show whatever the navigator
    /// points at.
    ///
    /// Call after an action that navigates (sign-in, sign-out).
    pub async fn sync(&self) -> Result<ActiveScreen> {
        let target = self.shell.ctx.navigator.enforce_guard();
        self.shell.show(target).await
    }

    /// Apply the back-button policy and follow the result.
    pub async fn back_press(&self) -> Result<BackPress> {
        // ---
        let outcome = self.shell.ctx.navigator.handle_back_press();
        if let BackPress::NavigatedBack(route) = &outcome {
            self.shell.show(*route).await?;
        }
        Ok(outcome)
    }

    /// Stop following the session and unmount the active screen.
    pub async fn shutdown(&self) {
        // ---
        if let Some(watcher) = &self.watcher {
            watcher.abort();
        }
        if let Some(screen) = self.shell.active.lock().await.take() {
            screen.as_screen().unmount().await;
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Some(watcher) = &self.watcher {
            watcher.abort();
        }
    }
}

impl Shell {
    // ---
    async fn show(&self, route: Route) -> Result<ActiveScreen> {
        let mut active = self.active.lock().await;
        self.swap(&mut active, route).await
    }

    /// Leave a mounted main screen once the session is gone.
    async fn leave_main_screen(&self) -> Result<()> {
        // ---
        let target = self.ctx.navigator.enforce_guard();
        let mut active = self.active.lock().await;
        let on_main = active.as_ref().is_some_and(|screen| screen.route().is_main());
        if on_main {
            self.swap(&mut active, target).await?;
        }
        Ok(())
    }

    async fn swap(&self, active: &mut Option<ActiveScreen>, route: Route) -> Result<ActiveScreen> {
        // ---
        if let Some(current) = active.as_ref() {
            if current.route() == route {
                return Ok(current.clone());
            }
            current.as_screen().unmount().await;
        }

        log_debug!("mounting {route}");
        let screen = ActiveScreen::for_route(route, &self.ctx);
        // mount failures have already produced a notice
        if let Err(err) = screen.as_screen().mount().await {
            log_error!("mounting {route} failed: {err}");
        }
        *active = Some(screen.clone());
        Ok(screen)
    }
}

/// Runs until the provider goes away or the app is shut down.
async fn follow_session(shell: Arc<Shell>) {
    // ---
    let mut session = shell.ctx.session.clone();
    loop {
        match session.changed().await {
            Ok(Some(_)) => {}
            Ok(None) => {
                if let Err(err) = shell.leave_main_screen().await {
                    log_error!("leaving the main screen failed: {err}");
                }
            }
            Err(_) => break,
        }
    }
}
