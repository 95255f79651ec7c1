//! Timestamped channel readings and their wire form.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde_json::{json, Value};

use crate::ValidationError;

/// How a record with a missing or `null` value is treated.
///
/// The device and the control screen have historically written `0` for
/// absent readings and readers have done the same, so `CoerceToZero` is the
/// compatible default. `Reject` surfaces such records as
/// [`ValidationError::MissingValue`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingValuePolicy {
    #[default]
    CoerceToZero,
    Reject,
}

/// A single timestamped numeric reading for a channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    // ---
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

impl Sample {
    // ---
    /// Build a sample, rejecting NaN and infinities.
    pub fn new(value: f64, timestamp: DateTime<Utc>) -> Result<Self, ValidationError> {
        // ---
        if !value.is_finite() {
            return Err(ValidationError::NonNumericValue(value.to_string()));
        }
        Ok(Self { value, timestamp })
    }

    /// A sample stamped with the current time.
    pub fn now(value: f64) -> Result<Self, ValidationError> {
        Self::new(value, Utc::now())
    }

    /// Parse a stored record of the form
    /// `{ "value": number, "timestamp": "<RFC 3339>" }`.
    ///
    /// A timestamp without an offset is read as UTC.
    pub fn from_value(record: &Value, policy: MissingValuePolicy) -> Result<Self, ValidationError> {
        // ---
        let Some(fields) = record.as_object() else {
            return Err(ValidationError::NonNumericValue(record.to_string()));
        };

        let value = match fields.get("value") {
            None | Some(Value::Null) => match policy {
                MissingValuePolicy::CoerceToZero => 0.0,
                MissingValuePolicy::Reject => return Err(ValidationError::MissingValue),
            },
            Some(Value::Number(number)) => number
                .as_f64()
                .ok_or_else(|| ValidationError::NonNumericValue(number.to_string()))?,
            Some(other) => return Err(ValidationError::NonNumericValue(other.to_string())),
        };

        let timestamp = fields
            .get("timestamp")
            .and_then(Value::as_str)
            .ok_or_else(|| ValidationError::InvalidTimestamp("missing".into()))
            .and_then(parse_timestamp)?;

        Self::new(value, timestamp)
    }

    /// The stored record form, with a millisecond `Z` timestamp.
    pub fn to_value(&self) -> Value {
        json!({
            "value": self.value,
            "timestamp": self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    // ---
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| ValidationError::InvalidTimestamp(raw.to_string()))
}
