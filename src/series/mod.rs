//! Channel samples and the rolling windows screens render from.
//!
//! A [`RollingSeriesBuffer`] keeps the last N samples of one channel and
//! derives the current value, extrema and `DD/MM` labels. Screens share a
//! buffer between the subscription task that feeds it and the renderer that
//! reads it through [`SharedSeries`].

mod buffer;
mod history;
mod sample;
mod shared;

pub use buffer::{
    //
    Extrema,
    ExtremaMode,
    RollingSeriesBuffer,
    SeriesConfig,
    SeriesSnapshot,
};
pub use history::{ChannelFeed, HistoryFeed};
pub use sample::{MissingValuePolicy, Sample};
pub use shared::SharedSeries;

/// Render an optional reading with `decimals` places, or the "no data" marker.
pub fn format_reading(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(value) => format!("{value:.decimals$}"),
        None => crate::messages::NOT_AVAILABLE.to_string(),
    }
}
