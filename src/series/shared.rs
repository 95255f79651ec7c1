use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{Extrema, RollingSeriesBuffer, Sample, SeriesConfig, SeriesSnapshot};
use crate::ValidationError;

fn read_ignore_poison<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_ignore_poison<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// A [`RollingSeriesBuffer`] shared between a subscription feed and readers.
///
/// Each mutation happens under one write lock, so a concurrent
/// [`snapshot`](Self::snapshot) sees the window either before or after a
/// push, never in between. `.clone()` is cheap and all clones share the same
/// buffer.
#[derive(Clone, Debug)]
pub struct SharedSeries {
    inner: Arc<RwLock<RollingSeriesBuffer>>,
}

impl SharedSeries {
    // ---
    pub fn new(config: SeriesConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(RollingSeriesBuffer::new(config))),
        }
    }

    pub fn push(&self, sample: Sample) -> Result<(), ValidationError> {
        write_ignore_poison(&self.inner).push(sample)
    }

    pub fn clear(&self) {
        write_ignore_poison(&self.inner).clear();
    }

    /// Clear, then push `samples` in order, under a single lock.
    ///
    /// Invalid samples are skipped and counted out of the return value.
    pub fn replace_all(&self, samples: impl IntoIterator<Item = Sample>) -> usize {
        // ---
        let mut buffer = write_ignore_poison(&self.inner);
        buffer.clear();
        samples
            .into_iter()
            .filter(|sample| buffer.push(*sample).is_ok())
            .count()
    }

    pub fn snapshot(&self) -> SeriesSnapshot {
        read_ignore_poison(&self.inner).snapshot()
    }

    pub fn current_value(&self) -> Option<f64> {
        read_ignore_poison(&self.inner).current_value()
    }

    pub fn extrema(&self) -> Extrema {
        read_ignore_poison(&self.inner).extrema()
    }

    pub fn labels(&self, every_nth: usize) -> Vec<String> {
        read_ignore_poison(&self.inner).labels(every_nth)
    }

    pub fn len(&self) -> usize {
        read_ignore_poison(&self.inner).len()
    }

    pub fn is_empty(&self) -> bool {
        read_ignore_poison(&self.inner).is_empty()
    }
}
