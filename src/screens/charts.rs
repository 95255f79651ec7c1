//! History charts screen.
//!
//! Extrema are computed over the visible window only. Pump speeds are shown
//! in hundreds of RPM.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use super::board::{ChannelBoard, ChannelReading};
use super::lifecycle::{BusyFlag, Lifecycle};
use super::{AppContext, Screen};
use crate::{log_warn, messages, Channel, ExtremaMode, Notice, Result, Route, SeriesConfig, SharedSeries};

const RPM_DIVISOR: f64 = 100.0;

const LAYOUT: [(Channel, usize, f64); 4] = [
    (Channel::Ph, 1, 1.0),
    (Channel::Temperature, 1, 1.0),
    (Channel::Rpm1, 1, RPM_DIVISOR),
    (Channel::Rpm2, 1, RPM_DIVISOR),
];

const CHANNELS: [Channel; 4] = [Channel::Ph, Channel::Temperature, Channel::Rpm1, Channel::Rpm2];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartsView {
    pub charts: Vec<ChannelReading>,
    pub loading: bool,
}

#[derive(Clone)]
pub struct ChartsScreen {
    inner: Arc<Inner>,
}

struct Inner {
    ctx: AppContext,
    board: ChannelBoard,
    busy: BusyFlag,
    lifecycle: Lifecycle,
}

impl ChartsScreen {
    // ---
    pub fn new(ctx: AppContext) -> Self {
        // ---
        let series = SeriesConfig::new(ctx.config.chart_window, ExtremaMode::Windowed)
            .with_label_stride(ctx.config.chart_label_stride)
            .with_label_offset(ctx.config.label_offset);
        let board = ChannelBoard::new(&ctx, &LAYOUT, series);
        Self {
            inner: Arc::new(Inner {
                ctx,
                board,
                busy: BusyFlag::default(),
                lifecycle: Lifecycle::default(),
            }),
        }
    }

    pub fn view(&self) -> ChartsView {
        ChartsView {
            charts: self.inner.board.readings(),
            loading: self.inner.busy.is_busy(),
        }
    }

    pub fn series(&self, channel: Channel) -> Option<SharedSeries> {
        self.inner.board.series(channel)
    }

    pub fn is_busy(&self) -> bool {
        self.inner.busy.is_busy()
    }

    pub fn active_feeds(&self) -> usize {
        self.inner.lifecycle.feed_count()
    }

    /// Clear every chart and repopulate it from one read per channel.
    pub async fn reload(&self) -> Result<()> {
        // ---
        let _busy = self.inner.busy.try_begin()?;
        let ctx = &self.inner.ctx;

        let result = self.inner.board.reload_all(ctx, &self.inner.lifecycle).await;
        if let Err(err) = &result {
            log_warn!("charts reload failed: {err}");
            ctx.notify(Notice::error(messages::LOAD_FAILED));
        }
        result
    }

    /// Empty every chart until new samples arrive.
    pub fn clear(&self) {
        self.inner.board.clear(&CHANNELS);
    }
}

#[async_trait]
impl Screen for ChartsScreen {
    fn route(&self) -> Route {
        Route::Charts
    }

    async fn mount(&self) -> Result<()> {
        // ---
        let ctx = &self.inner.ctx;
        let lifecycle = &self.inner.lifecycle;
        lifecycle.stop_feeds().await;
        lifecycle.revive();

        let subscribed = self.inner.board.subscribe_all(ctx, lifecycle).await;
        if let Err(err) = &subscribed {
            log_warn!("charts subscriptions failed: {err}");
            lifecycle.stop_feeds().await;
            ctx.notify(Notice::error(messages::LOAD_FAILED));
        }
        subscribed
    }

    async fn unmount(&self) {
        self.inner.lifecycle.shutdown().await;
    }
}
