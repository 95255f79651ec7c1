//! Headless client for a small bioreactor / water-pump installation.
//!
//! Screens subscribe to a realtime data source, keep a bounded rolling
//! window of samples per channel, and write actuator setpoints back. All
//! persistence and authentication are delegated to a backend reached through
//! the [`RemoteDataSource`] and [`AuthProvider`] traits; in-memory reference
//! implementations are provided for tests and demos.
//!

// Import all sub modules once...
mod actuator;
mod app;
mod append_key;
mod channel;
mod config;
mod data_source;
mod domain;
mod error;
mod macros;
mod navigator;
mod notify;
mod session;

pub mod feed;
pub mod messages;
pub mod screens;
pub mod series;

pub(crate) use macros::{log_debug, log_error, log_info, log_warn};

// Re-export main types
pub use app::{ActiveScreen, App, AppBuilder};
pub use screens::{AppContext, Screen};

pub use config::{ClientConfig, DataPaths};

pub use actuator::{ActuatorState, Setpoints};
pub use append_key::AppendKey;
pub use channel::{Channel, UnknownChannel};
pub use error::{Error, Result, ValidationError};
pub use navigator::{BackPress, ExitPrompt, Navigator, Route};
pub use notify::{LogNotifier, Notice, NoticeKind, Notifier, NotifierPtr, RecordingNotifier};
pub use session::Session;

pub use series::{
    //
    ChannelFeed,
    Extrema,
    ExtremaMode,
    HistoryFeed,
    MissingValuePolicy,
    RollingSeriesBuffer,
    Sample,
    SeriesConfig,
    SeriesSnapshot,
    SharedSeries,
};

pub use data_source::{
    //
    create_memory_auth_provider,
    create_memory_data_source,
    MemoryAuthProvider,
    MemoryDataSource,
};

// --- public re-exports
pub use domain::{
    //
    AuthError,
    AuthErrorCode,
    AuthProvider,
    AuthProviderPtr,
    AuthUser,
    Change,
    Credential,
    DataPath,
    DataSourcePtr,
    RemoteDataSource,
    SubscriptionHandle,
};
