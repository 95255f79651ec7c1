//! Busy and alive flags shared by every screen controller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::feed::FeedHandle;
use crate::{Error, Result};

fn lock_ignore_poison<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Rejects re-entrant triggering of one action.
#[derive(Debug, Default)]
pub(crate) struct BusyFlag(AtomicBool);

impl BusyFlag {
    // ---
    /// Mark the action in flight, or fail with [`Error::Busy`].
    pub(crate) fn try_begin(&self) -> Result<BusyGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| BusyGuard(&self.0))
            .map_err(|_| Error::Busy)
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Clears the busy flag when dropped.
pub(crate) struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Mounted state plus the feeds a screen owns while mounted.
///
/// A controller is alive from construction until `unmount`. Results of
/// backend calls that complete after that are not applied to view state.
#[derive(Debug)]
pub(crate) struct Lifecycle {
    alive: AtomicBool,
    feeds: Mutex<Vec<FeedHandle>>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            alive: AtomicBool::new(true),
            feeds: Mutex::new(Vec::new()),
        }
    }
}

impl Lifecycle {
    // ---
    pub(crate) fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub(crate) fn revive(&self) {
        self.alive.store(true, Ordering::Release);
    }

    pub(crate) fn hold(&self, feed: FeedHandle) {
        lock_ignore_poison(&self.feeds).push(feed);
    }

    pub(crate) fn feed_count(&self) -> usize {
        lock_ignore_poison(&self.feeds).len()
    }

    /// Stop every held feed without marking the screen dead.
    pub(crate) async fn stop_feeds(&self) {
        // ---
        let feeds = std::mem::take(&mut *lock_ignore_poison(&self.feeds));
        for feed in feeds {
            feed.stop().await;
        }
    }

    /// Mark the screen dead, then stop its feeds.
    pub(crate) async fn shutdown(&self) {
        self.alive.store(false, Ordering::Release);
        self.stop_feeds().await;
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_busy_flag_rejects_reentry() {
        // ---
        let flag = BusyFlag::default();
        let guard = flag.try_begin().unwrap();
        assert!(flag.is_busy());
        assert!(matches!(flag.try_begin(), Err(Error::Busy)));
        drop(guard);
        assert!(!flag.is_busy());
        assert!(flag.try_begin().is_ok());
    }

    #[tokio::test]
    async fn test_shutdown_marks_dead() {
        // ---
        let lifecycle = Lifecycle::default();
        assert!(lifecycle.is_alive());
        lifecycle.shutdown().await;
        assert!(!lifecycle.is_alive());
        lifecycle.revive();
        assert!(lifecycle.is_alive());
    }
}
