//! Turning channel path snapshots into buffer pushes.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use super::{MissingValuePolicy, Sample, SharedSeries};
use crate::feed::ChangeConsumer;
use crate::{log_debug, log_warn, Change, Channel, Result};

fn lock_ignore_poison<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Cursor over successive snapshots of one channel path.
///
/// A channel path holds one of three shapes:
///
/// - a bare number: a live reading, stamped with arrival time
/// - a single `{ value, timestamp }` record
/// - a map of append key to record: a history log
///
/// For history logs only entries whose key sorts after the last key consumed
/// are returned, so a subscription that re-delivers the whole log on every
/// append yields each entry once.
#[derive(Debug, Clone, Default)]
pub struct HistoryFeed {
    // ---
    policy: MissingValuePolicy,
    last_key: Option<String>,
}

impl HistoryFeed {
    // ---
    pub fn new(policy: MissingValuePolicy) -> Self {
        Self {
            policy,
            last_key: None,
        }
    }

    pub fn last_key(&self) -> Option<&str> {
        self.last_key.as_deref()
    }

    /// Forget the cursor; the next history snapshot is consumed in full.
    pub fn reset(&mut self) {
        self.last_key = None;
    }

    /// Samples contained in `value` that have not been returned before.
    ///
    /// Invalid entries are logged and skipped. The cursor still moves past
    /// them so they are not reported again.
    pub fn ingest(&mut self, value: Option<&Value>) -> Vec<Sample> {
        // ---
        let Some(value) = value else {
            return Vec::new();
        };

        match value {
            Value::Null => Vec::new(),
            Value::Number(number) => match number.as_f64().map(Sample::now) {
                Some(Ok(sample)) => vec![sample],
                _ => {
                    log_warn!("skipping live reading {number}: not a finite number");
                    Vec::new()
                }
            },
            Value::Object(fields) if fields.contains_key("value") || fields.contains_key("timestamp") => {
                match Sample::from_value(value, self.policy) {
                    Ok(sample) => vec![sample],
                    Err(err) => {
                        log_warn!("skipping record: {err}");
                        Vec::new()
                    }
                }
            }
            Value::Object(entries) => {
                let mut keys: Vec<&String> = entries
                    .keys()
                    .filter(|key| self.last_key.as_deref().map_or(true, |last| key.as_str() > last))
                    .collect();
                keys.sort();

                let mut samples = Vec::with_capacity(keys.len());
                for key in &keys {
                    match Sample::from_value(&entries[key.as_str()], self.policy) {
                        Ok(sample) => samples.push(sample),
                        Err(err) => log_warn!("skipping history entry {key}: {err}"),
                    }
                }
                if let Some(newest) = keys.last() {
                    self.last_key = Some(newest.to_string());
                }
                samples
            }
            other => {
                log_warn!("skipping unexpected channel value: {other}");
                Vec::new()
            }
        }
    }
}

/// Drives one [`SharedSeries`] from one channel subscription.
///
/// Values are divided by `divisor` before they reach the series; charts
/// use this to show pump speeds in hundreds of RPM.
#[derive(Debug)]
pub struct ChannelFeed {
    // ---
    channel: Channel,
    series: SharedSeries,
    divisor: f64,
    history: Mutex<HistoryFeed>,
}

impl ChannelFeed {
    // ---
    pub fn new(channel: Channel, series: SharedSeries, policy: MissingValuePolicy) -> Self {
        Self {
            channel,
            series,
            divisor: 1.0,
            history: Mutex::new(HistoryFeed::new(policy)),
        }
    }

    /// Zero is ignored.
    pub fn with_divisor(mut self, divisor: f64) -> Self {
        if divisor != 0.0 {
            self.divisor = divisor;
        }
        self
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn series(&self) -> &SharedSeries {
        &self.series
    }

    /// Push new samples from `value`; returns how many were pushed.
    pub fn ingest(&self, value: Option<&Value>) -> usize {
        // ---
        let mut history = lock_ignore_poison(&self.history);
        let pushed = history
            .ingest(value)
            .into_iter()
            .filter(|sample| self.series.push(self.scaled(*sample)).is_ok())
            .count();
        log_debug!("{}: pushed {pushed} sample(s)", self.channel);
        pushed
    }

    /// Clear the series and the cursor, then repopulate from `value`.
    pub fn reload(&self, value: Option<&Value>) -> usize {
        // ---
        let mut history = lock_ignore_poison(&self.history);
        history.reset();
        let samples = history.ingest(value);
        self.series
            .replace_all(samples.into_iter().map(|sample| self.scaled(sample)))
    }

    /// Clear the series without touching the cursor.
    pub fn clear(&self) {
        let _history = lock_ignore_poison(&self.history);
        self.series.clear();
    }

    fn scaled(&self, sample: Sample) -> Sample {
        Sample {
            value: sample.value / self.divisor,
            ..sample
        }
    }
}

#[async_trait]
impl ChangeConsumer for ChannelFeed {
    async fn on_change(&self, change: Change) -> Result<()> {
        self.ingest(change.value.as_ref());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::{ExtremaMode, SeriesConfig};
    use serde_json::json;

    fn record(value: f64, day: u32) -> Value {
        json!({ "value": value, "timestamp": format!("2024-03-{day:02}T12:00:00Z") })
    }

    #[test]
    fn test_history_map_is_consumed_once_in_key_order() {
        // ---
        let mut feed = HistoryFeed::new(MissingValuePolicy::CoerceToZero);
        let first = json!({ "k2": record(2.0, 2), "k1": record(1.0, 1) });
        let values: Vec<f64> = feed.ingest(Some(&first)).iter().map(|s| s.value).collect();
        assert_eq!(values, vec![1.0, 2.0]);
        assert_eq!(feed.last_key(), Some("k2"));

        let second = json!({ "k1": record(1.0, 1), "k2": record(2.0, 2), "k3": record(3.0, 3) });
        let values: Vec<f64> = feed.ingest(Some(&second)).iter().map(|s| s.value).collect();
        assert_eq!(values, vec![3.0]);
    }

    #[test]
    fn test_invalid_entries_are_skipped() {
        // ---
        let mut feed = HistoryFeed::new(MissingValuePolicy::Reject);
        let log = json!({
            "a": record(1.0, 1),
            "b": { "value": "oops", "timestamp": "2024-03-02T12:00:00Z" },
            "c": { "timestamp": "2024-03-03T12:00:00Z" },
            "d": record(4.0, 4),
        });
        let values: Vec<f64> = feed.ingest(Some(&log)).iter().map(|s| s.value).collect();
        assert_eq!(values, vec![1.0, 4.0]);
        assert_eq!(feed.last_key(), Some("d"));
    }

    #[test]
    fn test_live_number_and_single_record() {
        // ---
        let mut feed = HistoryFeed::default();
        assert_eq!(feed.ingest(Some(&json!(7.2)))[0].value, 7.2);
        assert_eq!(feed.ingest(Some(&record(30.5, 1)))[0].value, 30.5);
        assert!(feed.ingest(None).is_empty());
        assert!(feed.ingest(Some(&Value::Null)).is_empty());
        assert!(feed.ingest(Some(&json!("text"))).is_empty());
    }

    #[test]
    fn test_reset_replays_history() {
        // ---
        let mut feed = HistoryFeed::default();
        let log = json!({ "k1": record(1.0, 1) });
        assert_eq!(feed.ingest(Some(&log)).len(), 1);
        assert!(feed.ingest(Some(&log)).is_empty());
        feed.reset();
        assert_eq!(feed.ingest(Some(&log)).len(), 1);
    }

    #[test]
    fn test_channel_feed_scales_and_reloads() {
        // ---
        let series = SharedSeries::new(SeriesConfig::new(6, ExtremaMode::Windowed));
        let feed = ChannelFeed::new(Channel::Rpm1, series.clone(), MissingValuePolicy::CoerceToZero)
            .with_divisor(100.0);

        let log = json!({ "k1": record(1500.0, 1), "k2": record(1200.0, 2) });
        assert_eq!(feed.ingest(Some(&log)), 2);
        assert_eq!(series.snapshot().values, vec![15.0, 12.0]);

        feed.clear();
        assert!(series.is_empty());
        assert_eq!(feed.ingest(Some(&log)), 0);

        assert_eq!(feed.reload(Some(&log)), 2);
        assert_eq!(series.current_value(), Some(12.0));
    }
}
