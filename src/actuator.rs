//! Actuator records: the pump switch and its setpoints.
//!
//! Both live under `configuration/` and are single mutable records,
//! last write wins. There is no version or concurrency token.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Channel, Result};

/// Pump on/off state, stored at `configuration/actuator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActuatorState {
    pub on: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ActuatorState {
    pub fn new(on: bool, updated_at: DateTime<Utc>) -> Self {
        Self {
            on,
            updated_at: Some(updated_at),
        }
    }
}

/// Numeric setpoints, stored at `configuration/setpoints`.
///
/// Fields absent from the stored record stay `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Setpoints {
    pub rpm1: Option<f64>,
    pub rpm2: Option<f64>,
    pub temperature: Option<f64>,
    pub ph: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Setpoints {
    // ---
    /// Setpoint for `channel`. Water level has none.
    pub fn get(&self, channel: Channel) -> Option<f64> {
        // ---
        match channel {
            Channel::Rpm1 => self.rpm1,
            Channel::Rpm2 => self.rpm2,
            Channel::Temperature => self.temperature,
            Channel::Ph => self.ph,
            Channel::WaterLevel => None,
        }
    }

    /// Ignored for water level.
    pub fn set(&mut self, channel: Channel, value: f64) {
        // ---
        let slot = match channel {
            Channel::Rpm1 => &mut self.rpm1,
            Channel::Rpm2 => &mut self.rpm2,
            Channel::Temperature => &mut self.temperature,
            Channel::Ph => &mut self.ph,
            Channel::WaterLevel => return,
        };
        *slot = Some(value);
    }
}

/// Decode a stored record; an absent value is the type's default.
pub(crate) fn decode_or_default<T>(value: Option<Value>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match value {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => Ok(serde_json::from_value(value)?),
    }
}
