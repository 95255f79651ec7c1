// src/data_source/memory/mod.rs

//! In-memory backends.
//!
//! This module provides pure in-process implementations of the domain-level
//! `RemoteDataSource` and `AuthProvider` traits. They are intended primarily
//! for testing, local execution, and as a reference for backend semantics.
//!
//! ## Reference Semantics
//!
//! The in-memory backends define the **reference behavior** for the backend
//! layer. Adapters for hosted services are expected to approximate this
//! behavior as closely as their SDKs allow and to document any unavoidable
//! deviations.
//!
//! In particular, the in-memory data source establishes the following
//! expectations:
//!
//! - Once `subscribe()` returns successfully, writes made *after* that point
//!   and overlapping the subscription are delivered.
//! - Delivery is deterministic within a single process.
//! - No change notification is dropped while the subscription is open.
//!
//! ## Non-Goals
//!
//! These backends do not attempt to emulate the persistence, offline
//! behavior or security rules of any specific service.

mod auth;
mod data_source;
mod tree;

pub use auth::{create_auth_provider, MemoryAuthProvider};
pub use data_source::{create_data_source, MemoryDataSource};
