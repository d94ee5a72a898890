//! Reading payloads
//!
//! A `Reading` is one sample from one sensor kind on one street. It is the
//! JSON body published on `smartcity/{district}/{street}/{sensor_kind}`:
//!
//! ```json
//! {"value": 21.5, "unit": "C", "timestamp": 1718000000.123}
//! ```
//!
//! `timestamp` is seconds since the UNIX epoch with a fractional part.
//! `unit` is left out of the body when the sensor kind has none.

use serde::{Deserialize, Serialize};

/// Prefix shared by every topic the simulator publishes or subscribes to.
pub const TOPIC_ROOT: &str = "smartcity";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub timestamp: f64,
}

impl Reading {
    pub fn new(value: f64, unit: Option<String>, timestamp: f64) -> Self {
        Self {
            value,
            unit,
            timestamp,
        }
    }

    /// Builds a reading stamped with the current wall-clock time.
    pub fn now(value: f64, unit: Option<String>) -> Self {
        let timestamp = chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0;
        Self::new(value, unit, timestamp)
    }
}

/// Topic a street publishes `sensor_kind` readings on.
pub fn sensor_topic(district: &str, street: &str, sensor_kind: &str) -> String {
    format!("{TOPIC_ROOT}/{district}/{street}/{sensor_kind}")
}
