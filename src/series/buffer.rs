//! Bounded rolling window of channel samples.

use std::collections::VecDeque;

use chrono::{FixedOffset, Offset, Utc};
use serde::Serialize;

use super::Sample;
use crate::ValidationError;

/// Policy for computing max/min.
///
/// There is no default: each screen picks one and uses it for
/// every channel it shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtremaMode {
    /// Tracked since creation (or the last `clear()`), unaffected by eviction.
    AllTime,
    /// Recomputed over the samples currently retained.
    Windowed,
}

/// Max and min, each absent until a sample has been seen.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Extrema {
    pub max: Option<f64>,
    pub min: Option<f64>,
}

impl Extrema {
    fn include(&mut self, value: f64) {
        self.max = Some(self.max.map_or(value, |max| max.max(value)));
        self.min = Some(self.min.map_or(value, |min| min.min(value)));
    }
}

/// Construction parameters for a [`RollingSeriesBuffer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesConfig {
    /// Maximum samples retained. Zero is treated as one.
    pub capacity: usize,
    pub extrema_mode: ExtremaMode,
    /// Thinning stride used by [`RollingSeriesBuffer::snapshot`].
    pub label_stride: usize,
    /// Offset applied before formatting `DD/MM` labels.
    pub label_offset: FixedOffset,
}

impl SeriesConfig {
    // ---
    pub fn new(capacity: usize, extrema_mode: ExtremaMode) -> Self {
        // ---
        Self {
            capacity: capacity.max(1),
            extrema_mode,
            label_stride: 1,
            label_offset: utc(),
        }
    }

    pub fn with_label_stride(mut self, stride: usize) -> Self {
        self.label_stride = stride.max(1);
        self
    }

    pub fn with_label_offset(mut self, offset: FixedOffset) -> Self {
        self.label_offset = offset;
        self
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

/// Display-ready view of a buffer at one instant.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SeriesSnapshot {
    pub values: Vec<f64>,
    pub labels: Vec<String>,
    pub current: Option<f64>,
    pub max: Option<f64>,
    pub min: Option<f64>,
}

impl SeriesSnapshot {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Bounded FIFO window over one channel's samples.
///
/// Eviction is by arrival order only; timestamps are never compared.
#[derive(Debug, Clone)]
pub struct RollingSeriesBuffer {
    // ---
    config: SeriesConfig,
    window: VecDeque<Sample>,
    all_time: Extrema,
}

impl RollingSeriesBuffer {
    // ---
    pub fn new(config: SeriesConfig) -> Self {
        // ---
        let config = SeriesConfig {
            capacity: config.capacity.max(1),
            label_stride: config.label_stride.max(1),
            ..config
        };
        Self {
            window: VecDeque::with_capacity(config.capacity),
            config,
            all_time: Extrema::default(),
        }
    }

    pub fn config(&self) -> &SeriesConfig {
        &self.config
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Retained samples, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = &Sample> {
        self.window.iter()
    }

    /// Append a sample, evicting the oldest one when full.
    ///
    /// Only non-finite values are rejected; the buffer is left untouched in
    /// that case.
    pub fn push(&mut self, sample: Sample) -> Result<(), ValidationError> {
        // ---
        if !sample.value.is_finite() {
            return Err(ValidationError::NonNumericValue(sample.value.to_string()));
        }

        if self.window.len() >= self.config.capacity {
            self.window.pop_front();
        }
        self.window.push_back(sample);
        self.all_time.include(sample.value);
        Ok(())
    }

    /// The most recently pushed value, or `None` when empty.
    pub fn current_value(&self) -> Option<f64> {
        self.window.back().map(|sample| sample.value)
    }

    pub fn extrema(&self) -> Extrema {
        // ---
        match self.config.extrema_mode {
            ExtremaMode::AllTime => self.all_time,
            ExtremaMode::Windowed => {
                let mut extrema = Extrema::default();
                for sample in &self.window {
                    extrema.include(sample.value);
                }
                extrema
            }
        }
    }

    /// One `DD/MM` label per retained sample.
    ///
    /// With `every_nth > 1` only positions where `index % every_nth == 0`
    /// keep their label; the rest are empty strings. Zero behaves as one.
    pub fn labels(&self, every_nth: usize) -> Vec<String> {
        // ---
        let every_nth = every_nth.max(1);
        self.window
            .iter()
            .enumerate()
            .map(|(index, sample)| {
                if index % every_nth == 0 {
                    sample
                        .timestamp
                        .with_timezone(&self.config.label_offset)
                        .format("%d/%m")
                        .to_string()
                } else {
                    String::new()
                }
            })
            .collect()
    }

    /// Drop every sample and reset both extrema trackers.
    pub fn clear(&mut self) {
        self.window.clear();
        self.all_time = Extrema::default();
    }

    pub fn snapshot(&self) -> SeriesSnapshot {
        // ---
        let extrema = self.extrema();
        SeriesSnapshot {
            values: self.window.iter().map(|sample| sample.value).collect(),
            labels: self.labels(self.config.label_stride),
            current: self.current_value(),
            max: extrema.max,
            min: extrema.min,
        }
    }
}
