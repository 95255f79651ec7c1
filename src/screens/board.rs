//! Per-channel series shared by the monitoring and charts screens.

use std::sync::Arc;

use serde::Serialize;

use super::lifecycle::Lifecycle;
use super::AppContext;
use crate::series::format_reading;
use crate::{log_warn, Channel, ChannelFeed, Error, Result, SeriesConfig, SeriesSnapshot, SharedSeries};

/// Display-ready state of one channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelReading {
    // ---
    pub channel: Channel,
    pub unit: &'static str,
    /// Current value formatted, or `N/A`.
    pub current: String,
    pub max: String,
    pub min: String,
    pub snapshot: SeriesSnapshot,
}

impl ChannelReading {
    /// `Nenhum dado disponível` while the window is empty.
    pub fn placeholder(&self) -> Option<&'static str> {
        self.snapshot.is_empty().then_some(crate::messages::NO_DATA)
    }
}

struct Slot {
    feed: Arc<ChannelFeed>,
    decimals: usize,
}

/// One [`ChannelFeed`] per shown channel, in display order.
pub(crate) struct ChannelBoard {
    slots: Vec<Slot>,
}

impl ChannelBoard {
    // ---
    /// `layout` lists each channel with its display decimals and divisor.
    pub(crate) fn new(ctx: &AppContext, layout: &[(Channel, usize, f64)], series: SeriesConfig) -> Self {
        // ---
        let policy = ctx.config.missing_value_policy;
        let slots = layout
            .iter()
            .map(|&(channel, decimals, divisor)| Slot {
                feed: Arc::new(
                    ChannelFeed::new(channel, SharedSeries::new(series), policy).with_divisor(divisor),
                ),
                decimals,
            })
            .collect();
        Self { slots }
    }

    pub(crate) fn series(&self, channel: Channel) -> Option<SharedSeries> {
        self.slots
            .iter()
            .find(|slot| slot.feed.channel() == channel)
            .map(|slot| slot.feed.series().clone())
    }

    /// Subscribe every channel's history path. Feeds are kept in `lifecycle`.
    pub(crate) async fn subscribe_all(&self, ctx: &AppContext, lifecycle: &Lifecycle) -> Result<()> {
        // ---
        for slot in &self.slots {
            let path = ctx.config.paths.history(slot.feed.channel());
            let feed = ctx.feed(path, slot.feed.clone()).await?;
            lifecycle.hold(feed);
        }
        Ok(())
    }

    /// Read every channel once and repopulate its series.
    ///
    /// A failed read leaves that channel untouched; the first error is
    /// returned after all channels have been tried.
    pub(crate) async fn reload_all(&self, ctx: &AppContext, lifecycle: &Lifecycle) -> Result<()> {
        // ---
        let mut first_error: Option<Error> = None;
        for slot in &self.slots {
            let channel = slot.feed.channel();
            match ctx.read(&ctx.config.paths.history(channel)).await {
                Ok(value) => {
                    if lifecycle.is_alive() {
                        slot.feed.reload(value.as_ref());
                    }
                }
                Err(err) => {
                    log_warn!("reload of {channel} failed: {err}");
                    first_error.get_or_insert(err);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Clear the listed channels' series. Subscriptions are unaffected.
    pub(crate) fn clear(&self, channels: &[Channel]) {
        for slot in self.slots.iter().filter(|slot| channels.contains(&slot.feed.channel())) {
            slot.feed.clear();
        }
    }

    pub(crate) fn readings(&self) -> Vec<ChannelReading> {
        // ---
        self.slots
            .iter()
            .map(|slot| {
                let channel = slot.feed.channel();
                let snapshot = slot.feed.series().snapshot();
                ChannelReading {
                    channel,
                    unit: channel.unit(),
                    current: format_reading(snapshot.current, slot.decimals),
                    max: format_reading(snapshot.max, slot.decimals),
                    min: format_reading(snapshot.min, slot.decimals),
                    snapshot,
                }
            })
            .collect()
    }
}
