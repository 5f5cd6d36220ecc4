//! Sensor payload returned by the ESPHome web server.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// One sensor entity as reported by `GET /sensor/<id>`.
///
/// ```json
/// { "id": "sensor-slider_1", "state": "512", "value": 512 }
/// ```
///
/// Only `value` carries the raw analog reading (0-1023 for a 10-bit ADC);
/// `id` and `state` are kept for logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Entity id as reported by the device
    #[serde(default)]
    pub id: String,
    /// Human readable state, including unit of measurement when configured
    #[serde(default)]
    pub state: String,
    /// Raw sensor value
    #[serde(deserialize_with = "deserialize_raw_value")]
    pub value: i32,
}

impl SensorReading {
    /// Create a new reading
    pub fn new(id: impl Into<String>, value: i32) -> Self {
        Self {
            id: id.into(),
            state: value.to_string(),
            value,
        }
    }
}

// ESPHome serializes sensor values as JSON numbers which may carry a fractional
// part when a filter is applied on the device; round those to the nearest step.
fn deserialize_raw_value<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;

    if let Some(value) = number.as_i64() {
        return i32::try_from(value)
            .map_err(|_| de::Error::custom(format!("sensor value {} out of range", value)));
    }

    match number.as_f64() {
        Some(value) if value.is_finite() && value.abs() <= i32::MAX as f64 => {
            Ok(value.round() as i32)
        }
        _ => Err(de::Error::custom(format!(
            "sensor value {} out of range",
            number
        ))),
    }
}
