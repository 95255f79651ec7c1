//! Domain layer public interface.
//!
//! This module defines the backend-facing abstractions that are independent
//! of any concrete database, auth service, or SDK.
//!
//! All domain consumers must import symbols via this module, not by
//! referencing individual files directly.

mod auth;
mod data_source;

// --- Data source domain re-exports ---

pub use data_source::{
    //
    Change,
    DataPath,
    DataSourcePtr,
    RemoteDataSource,
    SubscriptionHandle,
};

// --- Auth domain re-exports ---

pub use auth::{
    //
    AuthError,
    AuthErrorCode,
    AuthProvider,
    AuthProviderPtr,
    AuthUser,
    Credential,
};
