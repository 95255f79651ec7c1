//! Monitored channels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One monitored physical quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Channel {
    Ph,
    Temperature,
    /// Pump 1 speed.
    Rpm1,
    /// Pump 2 speed.
    Rpm2,
    WaterLevel,
}

impl Channel {
    // ---
    pub const ALL: [Channel; 5] = [
        Channel::Ph,
        Channel::Temperature,
        Channel::Rpm1,
        Channel::Rpm2,
        Channel::WaterLevel,
    ];

    /// Channels that have an actuator setpoint.
    pub const SETPOINTS: [Channel; 4] = [
        Channel::Rpm1,
        Channel::Rpm2,
        Channel::Temperature,
        Channel::Ph,
    ];

    /// Path segment and wire name.
    pub fn key(self) -> &'static str {
        // ---
        match self {
            Channel::Ph => "ph",
            Channel::Temperature => "temperature",
            Channel::Rpm1 => "rpm1",
            Channel::Rpm2 => "rpm2",
            Channel::WaterLevel => "waterLevel",
        }
    }

    /// Display unit.
    pub fn unit(self) -> &'static str {
        match self {
            Channel::Ph => "pH",
            Channel::Temperature => "°C",
            Channel::Rpm1 | Channel::Rpm2 => "RPM",
            Channel::WaterLevel => "%",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Error returned when parsing an unknown channel name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown channel: {0}")]
pub struct UnknownChannel(pub String);

impl FromStr for Channel {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|channel| channel.key() == s)
            .ok_or_else(|| UnknownChannel(s.to_string()))
    }
}
