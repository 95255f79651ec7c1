//! Pump control screen.
//!
//! The form mirrors `configuration/actuator` and `configuration/setpoints`.
//! Remote updates overwrite the text fields.
//!
//! `save` issues its writes one after another and stops at the first
//! failure. Writes that already succeeded are not rolled back.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::lifecycle::{BusyFlag, Lifecycle};
use super::{AppContext, Screen};
use crate::actuator::decode_or_default;
use crate::feed::FnConsumer;
use crate::{
    // ---
    log_info,
    log_warn,
    messages,
    ActuatorState,
    Change,
    Channel,
    Error,
    Notice,
    Result,
    Route,
    Sample,
    Setpoints,
    ValidationError,
};

fn lock_ignore_poison<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Editable control state. Setpoints are kept as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ControlForm {
    // ---
    pub pump_on: bool,
    pub rpm1: String,
    pub rpm2: String,
    pub temperature: String,
    pub ph: String,
    /// Field rejected by the last save, with its inline message.
    pub field_error: Option<(&'static str, &'static str)>,
}

impl ControlForm {
    // ---
    fn field_mut(&mut self, channel: Channel) -> Option<&mut String> {
        match channel {
            Channel::Rpm1 => Some(&mut self.rpm1),
            Channel::Rpm2 => Some(&mut self.rpm2),
            Channel::Temperature => Some(&mut self.temperature),
            Channel::Ph => Some(&mut self.ph),
            Channel::WaterLevel => None,
        }
    }

    pub fn field(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::Rpm1 => Some(&self.rpm1),
            Channel::Rpm2 => Some(&self.rpm2),
            Channel::Temperature => Some(&self.temperature),
            Channel::Ph => Some(&self.ph),
            Channel::WaterLevel => None,
        }
    }

    fn apply_remote(&mut self, setpoints: &Setpoints) {
        for channel in Channel::SETPOINTS {
            if let Some(field) = self.field_mut(channel) {
                *field = setpoints.get(channel).map(|v| v.to_string()).unwrap_or_default();
            }
        }
    }

    /// Parse every setpoint field. Empty fields are zero.
    pub fn setpoints(&self, updated_at: DateTime<Utc>) -> std::result::Result<Setpoints, ValidationError> {
        // ---
        let mut setpoints = Setpoints {
            updated_at: Some(updated_at),
            ..Setpoints::default()
        };
        for channel in Channel::SETPOINTS {
            let input = self.field(channel).unwrap_or_default();
            setpoints.set(channel, parse_setpoint(channel.key(), input)?);
        }
        Ok(setpoints)
    }
}

fn parse_setpoint(field: &'static str, input: &str) -> std::result::Result<f64, ValidationError> {
    // ---
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::InvalidNumber {
            field,
            input: input.to_string(),
        }),
    }
}

#[derive(Clone)]
pub struct ControlScreen {
    inner: Arc<Inner>,
}

struct Inner {
    ctx: AppContext,
    form: Arc<Mutex<ControlForm>>,
    saving: BusyFlag,
    toggling: BusyFlag,
    lifecycle: Lifecycle,
}

impl ControlScreen {
    // ---
    pub fn new(ctx: AppContext) -> Self {
        Self {
            inner: Arc::new(Inner {
                ctx,
                form: Arc::new(Mutex::new(ControlForm::default())),
                saving: BusyFlag::default(),
                toggling: BusyFlag::default(),
                lifecycle: Lifecycle::default(),
            }),
        }
    }

    pub fn form(&self) -> ControlForm {
        lock_ignore_poison(&self.inner.form).clone()
    }

    pub fn is_saving(&self) -> bool {
        self.inner.saving.is_busy()
    }

    pub fn active_feeds(&self) -> usize {
        self.inner.lifecycle.feed_count()
    }

    /// Edit one setpoint field. Water level has no setpoint and is ignored.
    pub fn set_field(&self, channel: Channel, input: impl Into<String>) {
        // ---
        let mut form = lock_ignore_poison(&self.inner.form);
        if let Some(field) = form.field_mut(channel) {
            *field = input.into();
            if form.field_error.map(|(name, _)| name) == Some(channel.key()) {
                form.field_error = None;
            }
        }
    }

    /// Flip the pump and write the actuator record right away.
    ///
    /// The switch is reverted if the write fails.
    pub async fn toggle_actuator(&self) -> Result<bool> {
        // ---
        let _busy = self.inner.toggling.try_begin()?;
        let ctx = &self.inner.ctx;

        let on = {
            let mut form = lock_ignore_poison(&self.inner.form);
            form.pump_on = !form.pump_on;
            form.pump_on
        };

        let record = serde_json::to_value(ActuatorState::new(on, Utc::now()))?;
        match ctx.write(&ctx.config.paths.actuator(), record).await {
            Ok(()) => {
                log_info!("pump switched {}", if on { "on" } else { "off" });
                Ok(on)
            }
            Err(err) => {
                log_warn!("pump switch failed: {err}");
                if self.inner.lifecycle.is_alive() {
                    lock_ignore_poison(&self.inner.form).pump_on = !on;
                }
                ctx.notify(Notice::error(messages::ACTUATOR_UPDATE_FAILED));
                Err(err)
            }
        }
    }

    /// Write the actuator and setpoints, then log each setpoint to history.
    pub async fn save(&self) -> Result<()> {
        // ---
        let _busy = self.inner.saving.try_begin()?;
        let ctx = &self.inner.ctx;
        let now = Utc::now();
        let form = self.form();

        let setpoints = match form.setpoints(now) {
            Ok(setpoints) => setpoints,
            Err(err) => {
                if let ValidationError::InvalidNumber { field, .. } = err {
                    lock_ignore_poison(&self.inner.form).field_error = Some((field, messages::INVALID_NUMBER));
                }
                return Err(err.into());
            }
        };

        let result = self.write_all(form.pump_on, &setpoints, now).await;
        match &result {
            Ok(()) => ctx.notify(Notice::success(messages::SETTINGS_SAVED)),
            Err(err) => {
                log_warn!("saving settings failed: {err}");
                ctx.notify(Notice::error(messages::SETTINGS_SAVE_FAILED));
            }
        }
        result
    }

    async fn write_all(&self, on: bool, setpoints: &Setpoints, now: DateTime<Utc>) -> Result<()> {
        // ---
        let ctx = &self.inner.ctx;
        let paths = &ctx.config.paths;

        ctx.write(&paths.actuator(), serde_json::to_value(ActuatorState::new(on, now))?)
            .await?;
        ctx.write(&paths.setpoints(), serde_json::to_value(setpoints)?).await?;

        for channel in Channel::SETPOINTS {
            let value = setpoints.get(channel).unwrap_or_default();
            let sample = Sample::new(value, now).map_err(Error::from)?;
            ctx.append(&paths.history(channel), sample.to_value()).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Screen for ControlScreen {
    fn route(&self) -> Route {
        Route::Control
    }

    async fn mount(&self) -> Result<()> {
        // ---
        let ctx = &self.inner.ctx;
        let lifecycle = &self.inner.lifecycle;
        lifecycle.stop_feeds().await;
        lifecycle.revive();

        let form = self.inner.form.clone();
        let actuator = Arc::new(FnConsumer(move |change: Change| {
            let state: ActuatorState = decode_or_default(change.value)?;
            lock_ignore_poison(&form).pump_on = state.on;
            Ok(())
        }));

        let form = self.inner.form.clone();
        let setpoints = Arc::new(FnConsumer(move |change: Change| {
            if change.value.is_none() {
                return Ok(());
            }
            let remote: Setpoints = decode_or_default(change.value)?;
            lock_ignore_poison(&form).apply_remote(&remote);
            Ok(())
        }));

        let subscribed: Result<()> = async {
            lifecycle.hold(ctx.feed(ctx.config.paths.actuator(), actuator).await?);
            lifecycle.hold(ctx.feed(ctx.config.paths.setpoints(), setpoints).await?);
            Ok(())
        }
        .await;

        if let Err(err) = &subscribed {
            log_warn!("control subscriptions failed: {err}");
            lifecycle.stop_feeds().await;
            ctx.notify(Notice::error(messages::LOAD_FAILED));
        }
        subscribed
    }

    async fn unmount(&self) {
        self.inner.lifecycle.shutdown().await;
    }
}
