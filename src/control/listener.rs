//! Control-channel listener
//!
//! Every successful connect subscribes to `smartcity/config`. Payloads are
//! JSON objects; the only key understood is `time_sleep`, the number of
//! seconds each street sleeps between cycles:
//!
//! ```json
//! {"time_sleep": 2.5}
//! ```
//!
//! Numbers and numeric strings are accepted. Anything else (bad JSON, a
//! missing key, a negative, non-finite or out-of-range value) is logged and dropped; the
//! next valid message supersedes it. Nothing is acknowledged back.

use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use crate::control::runtime::RuntimeConfig;
use crate::utils::error::ControlError;

pub const CONTROL_TOPIC: &str = "smartcity/config";

#[derive(Debug, Clone)]
pub struct ControlListener {
    runtime: RuntimeConfig,
}

impl ControlListener {
    pub fn new(runtime: RuntimeConfig) -> Self {
        Self { runtime }
    }

    /// Applies one control payload, logging instead of failing.
    pub fn handle(&self, payload: &[u8]) {
        match self.apply(payload) {
            Ok(interval) => info!(
                "Config updated: sleep time set to {}s",
                interval.as_secs_f64()
            ),
            Err(e) => warn!("Ignoring control message: {e}"),
        }
    }

    /// Parses `payload` and stores the new sleep interval.
    pub fn apply(&self, payload: &[u8]) -> Result<Duration, ControlError> {
        let interval = parse_sleep_interval(payload)?;
        self.runtime.set_sleep_interval(interval);
        Ok(interval)
    }
}

pub fn parse_sleep_interval(payload: &[u8]) -> Result<Duration, ControlError> {
    let value: Value = serde_json::from_slice(payload)?;
    let object = value.as_object().ok_or(ControlError::NotAnObject)?;
    let raw = object.get("time_sleep").ok_or(ControlError::MissingSleep)?;

    let seconds = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    seconds
        .and_then(|s| Duration::try_from_secs_f64(s).ok())
        .ok_or_else(|| ControlError::InvalidSleep(raw.to_string()))
}
