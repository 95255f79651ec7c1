// src/domain/data_source.rs

//! Remote data source abstractions.
//!
//! This module defines the domain-level interface to the realtime backend
//! that stores sensor logs, actuator configuration and user profiles. It
//! intentionally avoids any reference to a concrete database product or SDK.
//!
//! The data source is a hierarchical, key-path-addressable JSON tree. Screen
//! controllers only ever read, write, append and subscribe by path; everything
//! above that (windowing, aggregation, form state) lives elsewhere.
//!
//! Concrete implementations of this interface live under `src/data_source/`.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::{AppendKey, Result};

/// A hierarchical data path such as `history/ph`.
///
/// Paths are normalized on construction: leading, trailing and repeated
/// separators are dropped, so `"/history//ph/"` and `"history/ph"` are the
/// same path. The empty path addresses the root of the tree.
///
/// Paths are immutable, cheap to clone, and safe to share across threads.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataPath(Arc<str>);

impl DataPath {
    // ---
    /// Build a normalized path.
    pub fn new(raw: &str) -> Self {
        // ---
        let joined = raw
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        DataPath(joined.into())
    }

    /// The root of the tree.
    pub fn root() -> Self {
        DataPath("".into())
    }

    /// The path as a string slice, without leading separator.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate the path segments from the root down.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|segment| !segment.is_empty())
    }

    /// Append one or more segments.
    pub fn child(&self, segment: &str) -> Self {
        // ---
        if self.is_root() {
            DataPath::new(segment)
        } else {
            DataPath::new(&format!("{}/{}", self.0, segment))
        }
    }

    /// True when `self` is a strict ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &DataPath) -> bool {
        // ---
        if self.is_root() {
            return !other.is_root();
        }
        other.0.len() > self.0.len()
            && other.0.starts_with(self.as_str())
            && other.0.as_bytes()[self.0.len()] == b'/'
    }

    /// True when a change at `self` is visible from `other`.
    ///
    /// That is the case when the two paths are equal or one contains
    /// the other.
    pub fn overlaps(&self, other: &DataPath) -> bool {
        self == other || self.is_ancestor_of(other) || other.is_ancestor_of(self)
    }
}

impl From<&str> for DataPath {
    fn from(value: &str) -> Self {
        DataPath::new(value)
    }
}

impl From<String> for DataPath {
    fn from(value: String) -> Self {
        DataPath::new(&value)
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A change notification delivered to a subscriber.
///
/// `value` is the full value now stored at the *subscribed* path, not at the
/// path that was written. `None` means nothing is stored there.
#[derive(Clone, Debug, PartialEq)]
pub struct Change {
    // ---
    pub path: DataPath,
    pub value: Option<Value>,
}

/// Handle returned from a successful subscription.
///
/// The subscription remains active until either:
/// - The handle is dropped (receiver channel closes)
/// - The data source is closed
///
/// The first message on `inbox` is the value stored at the path when the
/// subscription was registered. Every later message follows a write that
/// overlaps the path.
pub struct SubscriptionHandle {
    // ---
    /// Receiver channel for change notifications on this path.
    pub inbox: mpsc::UnboundedReceiver<Change>,
}

impl SubscriptionHandle {
    /// Release the subscription explicitly.
    ///
    /// Equivalent to dropping the handle.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

/// Remote data source abstraction.
///
/// Implementations must ensure that:
/// - Once `subscribe()` returns successfully, writes made *after* that point
///   that overlap the subscribed path are delivered to the returned inbox.
/// - `write()` replaces the whole value at a path; writing `Value::Null`
///   removes it.
/// - `append()` stores the value under a freshly generated child key whose
///   lexical order matches arrival order, and returns that key.
/// - No atomicity is promised across separate calls.
///
/// The in-memory data source serves as the reference implementation of these
/// semantics.
#[async_trait::async_trait]
pub trait RemoteDataSource: Send + Sync {
    // ---
    /// Read the value stored at `path` once.
    async fn read(&self, path: &DataPath) -> Result<Option<Value>>;

    /// Register a subscription for `path`.
    async fn subscribe(&self, path: &DataPath) -> Result<SubscriptionHandle>;

    /// Replace the value at `path`.
    async fn write(&self, path: &DataPath, value: Value) -> Result<()>;

    /// Append `value` as a new child of `path`.
    async fn append(&self, path: &DataPath, value: Value) -> Result<AppendKey>;

    /// Close the data source and release all subscriptions.
    async fn close(&self) -> Result<()>;
}

/// Shared data source pointer.
///
/// `.clone()` is cheap and all clones talk to the same backend.
pub type DataSourcePtr = Arc<dyn RemoteDataSource>;
