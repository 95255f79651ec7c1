//! Live monitoring screen.
//!
//! Shows the latest reading and the all-time extrema of every channel plus
//! the pump status. Extrema survive window eviction and reset only on
//! `clear()` or `reload()`.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde::Serialize;

use super::board::{ChannelBoard, ChannelReading};
use super::lifecycle::{BusyFlag, Lifecycle};
use super::{AppContext, Screen};
use crate::actuator::decode_or_default;
use crate::feed::FnConsumer;
use crate::{
    // ---
    log_warn,
    messages,
    ActuatorState,
    Change,
    Channel,
    ExtremaMode,
    Notice,
    Result,
    Route,
    SeriesConfig,
    SharedSeries,
};

fn lock_ignore_poison<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Channels in display order, with their decimals.
const LAYOUT: [(Channel, usize, f64); 5] = [
    (Channel::Ph, 1, 1.0),
    (Channel::Temperature, 1, 1.0),
    (Channel::WaterLevel, 1, 1.0),
    (Channel::Rpm1, 0, 1.0),
    (Channel::Rpm2, 0, 1.0),
];

/// Channels whose charts `clear()` resets.
const CHARTED: [Channel; 2] = [Channel::Ph, Channel::Temperature];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitoringView {
    pub channels: Vec<ChannelReading>,
    /// `None` until the actuator record has been seen.
    pub pump_on: Option<bool>,
    pub loading: bool,
}

#[derive(Clone)]
pub struct MonitoringScreen {
    inner: Arc<Inner>,
}

struct Inner {
    ctx: AppContext,
    board: ChannelBoard,
    pump_on: Arc<Mutex<Option<bool>>>,
    busy: BusyFlag,
    lifecycle: Lifecycle,
}

impl MonitoringScreen {
    // ---
    pub fn new(ctx: AppContext) -> Self {
        // ---
        let series = SeriesConfig::new(ctx.config.window_capacity, ExtremaMode::AllTime)
            .with_label_stride(ctx.config.monitoring_label_stride)
            .with_label_offset(ctx.config.label_offset);
        let board = ChannelBoard::new(&ctx, &LAYOUT, series);
        Self {
            inner: Arc::new(Inner {
                ctx,
                board,
                pump_on: Arc::new(Mutex::new(None)),
                busy: BusyFlag::default(),
                lifecycle: Lifecycle::default(),
            }),
        }
    }

    pub fn view(&self) -> MonitoringView {
        MonitoringView {
            channels: self.inner.board.readings(),
            pump_on: *lock_ignore_poison(&self.inner.pump_on),
            loading: self.inner.busy.is_busy(),
        }
    }

    pub fn series(&self, channel: Channel) -> Option<SharedSeries> {
        self.inner.board.series(channel)
    }

    pub fn is_busy(&self) -> bool {
        self.inner.busy.is_busy()
    }

    /// Number of subscriptions currently held.
    pub fn active_feeds(&self) -> usize {
        self.inner.lifecycle.feed_count()
    }

    /// Re-read every channel and the pump status once.
    pub async fn reload(&self) -> Result<()> {
        // ---
        let _busy = self.inner.busy.try_begin()?;
        let ctx = &self.inner.ctx;
        let lifecycle = &self.inner.lifecycle;

        let channels = self.inner.board.reload_all(ctx, lifecycle).await;
        let pump = ctx
            .read(&ctx.config.paths.actuator())
            .await
            .and_then(decode_or_default::<ActuatorState>)
            .map(|state| {
                if lifecycle.is_alive() {
                    *lock_ignore_poison(&self.inner.pump_on) = Some(state.on);
                }
            });

        let result = channels.and(pump);
        if let Err(err) = &result {
            log_warn!("monitoring reload failed: {err}");
            ctx.notify(Notice::error(messages::LOAD_FAILED));
        }
        result
    }

    /// Reset the pH and temperature charts. Subscriptions stay active.
    pub fn clear(&self) {
        self.inner.board.clear(&CHARTED);
    }
}

#[async_trait]
impl Screen for MonitoringScreen {
    fn route(&self) -> Route {
        Route::Monitoring
    }

    async fn mount(&self) -> Result<()> {
        // ---
        let ctx = &self.inner.ctx;
        let lifecycle = &self.inner.lifecycle;
        lifecycle.stop_feeds().await;
        lifecycle.revive();

        let pump_on = self.inner.pump_on.clone();
        let actuator = Arc::new(FnConsumer(move |change: Change| {
            let state: ActuatorState = decode_or_default(change.value)?;
            *lock_ignore_poison(&pump_on) = Some(state.on);
            Ok(())
        }));

        let subscribed: Result<()> = async {
            self.inner.board.subscribe_all(ctx, lifecycle).await?;
            lifecycle.hold(ctx.feed(ctx.config.paths.actuator(), actuator).await?);
            Ok(())
        }
        .await;

        if let Err(err) = &subscribed {
            log_warn!("monitoring subscriptions failed: {err}");
            lifecycle.stop_feeds().await;
            ctx.notify(Notice::error(messages::LOAD_FAILED));
        }
        subscribed
    }

    async fn unmount(&self) {
        self.inner.lifecycle.shutdown().await;
    }
}
