// src/data_source/memory/data_source.rs

//! In-memory data source implementation.
//!
//! This file contains the concrete implementation of the domain-level
//! `RemoteDataSource` trait using in-process data structures only.
//!
//! The memory data source is the **reference implementation** of data source
//! semantics. Adapters for hosted realtime databases are expected to
//! approximate this behavior as closely as their SDKs allow and to document
//! any unavoidable deviations.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{mpsc, RwLock};

use super::tree;
use crate::{
    // ---
    AppendKey,
    Change,
    DataPath,
    Error,
    RemoteDataSource,
    Result,
    SubscriptionHandle,
};

type Subscribers = HashMap<DataPath, Vec<mpsc::UnboundedSender<Change>>>;

/// Path prefixes whose reads or writes are made to fail or stall.
#[derive(Default)]
struct Faults {
    reads: Vec<DataPath>,
    writes: Vec<DataPath>,
    read_delays: Vec<(DataPath, Duration)>,
    write_delays: Vec<(DataPath, Duration)>,
}

fn matches_prefix(prefixes: &[DataPath], path: &DataPath) -> bool {
    prefixes
        .iter()
        .any(|prefix| prefix == path || prefix.is_ancestor_of(path))
}

/// Longest delay registered for a prefix covering `path`.
fn delay_for(delays: &[(DataPath, Duration)], path: &DataPath) -> Option<Duration> {
    delays
        .iter()
        .filter(|(prefix, _)| prefix == path || prefix.is_ancestor_of(path))
        .map(|(_, delay)| *delay)
        .max()
}

/// Acquire mutex guard, ignoring poisoning
fn lock_ignore_poison<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// In-memory data source.
///
/// This data source simulates a realtime database entirely within the
/// process. It is intended for tests, demos, and for validating screen
/// behavior without network or timing variability.
///
/// ## Semantics
///
/// - Subscriptions are registered immediately, and the current value at the
///   path is queued as the first notification.
/// - A write at `P` notifies every subscription whose path equals `P`, is an
///   ancestor of `P`, or is a descendant of `P`. Each receives the value now
///   stored at its own path.
/// - Notifications are queued while the tree lock is held, so every
///   subscriber observes writes in the order they were applied.
/// - Dropping a `SubscriptionHandle` implicitly unregisters the subscription.
///
/// ## Non-Goals
///
/// - Persistence or durability
/// - Network behavior beyond explicit fault injection
/// - Security rules or per-user access control
pub struct MemoryDataSource {
    // ---
    tree: RwLock<Value>,
    subscriptions: RwLock<Subscribers>,
    faults: Mutex<Faults>,
    closed: AtomicBool,
}

impl MemoryDataSource {
    // ---
    fn new() -> Self {
        Self {
            tree: RwLock::new(Value::Null),
            subscriptions: RwLock::new(HashMap::new()),
            faults: Mutex::new(Faults::default()),
            closed: AtomicBool::new(false),
        }
    }

    /// Make every write and append at or below `prefix` fail with
    /// [`Error::Write`].
    pub fn fail_writes_under(&self, prefix: impl Into<DataPath>) {
        lock_ignore_poison(&self.faults).writes.push(prefix.into());
    }

    /// Make every read and subscribe at or below `prefix` fail with
    /// [`Error::Read`].
    pub fn fail_reads_under(&self, prefix: impl Into<DataPath>) {
        lock_ignore_poison(&self.faults).reads.push(prefix.into());
    }

    /// Hold every write and append at or below `prefix` for `delay`
    /// before it is applied or rejected.
    pub fn delay_writes_under(&self, prefix: impl Into<DataPath>, delay: Duration) {
        lock_ignore_poison(&self.faults).write_delays.push((prefix.into(), delay));
    }

    /// Hold every read at or below `prefix` for `delay`. Subscriptions are
    /// not delayed.
    pub fn delay_reads_under(&self, prefix: impl Into<DataPath>, delay: Duration) {
        lock_ignore_poison(&self.faults).read_delays.push((prefix.into(), delay));
    }

    /// Remove all injected faults and delays.
    pub fn clear_faults(&self) {
        // ---
        let mut faults = lock_ignore_poison(&self.faults);
        *faults = Faults::default();
    }

    /// Number of live subscriptions registered on exactly `path`.
    pub async fn subscriber_count(&self, path: &DataPath) -> usize {
        // ---
        let subs = self.subscriptions.read().await;
        subs.get(path)
            .map(|senders| senders.iter().filter(|tx| !tx.is_closed()).count())
            .unwrap_or(0)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::Closed);
        }
        Ok(())
    }

    async fn stall_read(&self, path: &DataPath) {
        let delay = delay_for(&lock_ignore_poison(&self.faults).read_delays, path);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    async fn stall_write(&self, path: &DataPath) {
        let delay = delay_for(&lock_ignore_poison(&self.faults).write_delays, path);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn check_read(&self, path: &DataPath) -> Result<()> {
        // ---
        self.ensure_open()?;
        if matches_prefix(&lock_ignore_poison(&self.faults).reads, path) {
            return Err(Error::Read(format!("read rejected at {path}")));
        }
        Ok(())
    }

    fn check_write(&self, path: &DataPath) -> Result<()> {
        // ---
        self.ensure_open()?;
        if matches_prefix(&lock_ignore_poison(&self.faults).writes, path) {
            return Err(Error::Write(format!("write rejected at {path}")));
        }
        Ok(())
    }

    async fn apply(&self, path: &DataPath, value: Value) {
        // ---
        let mut root = self.tree.write().await;
        tree::set(&mut root, path, value);

        let mut subs = self.subscriptions.write().await;
        subs.retain(|sub_path, senders| {
            senders.retain(|tx| !tx.is_closed());
            if sub_path.overlaps(path) {
                let change = Change {
                    path: sub_path.clone(),
                    value: tree::get(&root, sub_path).cloned(),
                };
                for tx in senders.iter() {
                    // a closed channel means the handle was dropped
                    let _ = tx.send(change.clone());
                }
            }
            !senders.is_empty()
        });
    }
}

#[async_trait::async_trait]
impl RemoteDataSource for MemoryDataSource {
    // ---

    async fn read(&self, path: &DataPath) -> Result<Option<Value>> {
        // ---
        self.stall_read(path).await;
        self.check_read(path)?;
        let root = self.tree.read().await;
        Ok(tree::get(&root, path).cloned())
    }

    /// Register a subscription.
    ///
    /// The current value is queued on the inbox before this returns, and
    /// no write can land between that snapshot and the registration.
    async fn subscribe(&self, path: &DataPath) -> Result<SubscriptionHandle> {
        // ---
        self.check_read(path)?;

        let (tx, rx) = mpsc::unbounded_channel();

        let root = self.tree.read().await;
        let mut subs = self.subscriptions.write().await;

        let _ = tx.send(Change {
            path: path.clone(),
            value: tree::get(&root, path).cloned(),
        });
        subs.entry(path.clone()).or_default().push(tx);

        crate::log_debug!("memory data source: subscribed to {path}");
        Ok(SubscriptionHandle { inbox: rx })
    }

    async fn write(&self, path: &DataPath, value: Value) -> Result<()> {
        // ---
        self.stall_write(path).await;
        self.check_write(path)?;
        self.apply(path, value).await;
        Ok(())
    }

    async fn append(&self, path: &DataPath, value: Value) -> Result<AppendKey> {
        // ---
        self.stall_write(path).await;
        self.check_write(path)?;
        let key = AppendKey::generate();
        self.apply(&path.child(key.as_str()), value).await;
        Ok(key)
    }

    /// Close the data source.
    ///
    /// For the in-memory data source, this drops all subscriptions so that
    /// every open inbox observes end-of-stream. Later calls fail with
    /// [`Error::Closed`].
    async fn close(&self) -> Result<()> {
        // ---
        self.closed.store(true, Ordering::Release);
        let mut subs = self.subscriptions.write().await;
        subs.clear();
        Ok(())
    }
}

/// Create a new in-memory data source.
///
/// Returned as a concrete `Arc` so tests can reach the fault-injection
/// hooks; it coerces to [`DataSourcePtr`](crate::DataSourcePtr) wherever one
/// is expected.
pub fn create_data_source() -> Arc<MemoryDataSource> {
    Arc::new(MemoryDataSource::new())
}
