//! The `error` module defines the error types used within the simulator.
//!
//! Errors fall into three families that are handled very differently:
//!
//! - [`ConfigError`]: raised while loading settings or building the topology.
//!   Fatal at startup, never retried.
//! - [`TransportError`]: raised by a transport adapter while connecting or
//!   driving a link. Always absorbed by the connection manager, which keeps
//!   retrying on its fixed schedule.
//! - [`ControlError`]: raised while decoding a control-topic payload. Logged
//!   and discarded; the runtime configuration is left untouched.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("sensor kind '{0}' has no sampling range")]
    UnknownSensor(String),

    #[error("no sensor kinds configured")]
    NoSensors,

    #[error("topology has no districts")]
    EmptyTopology,

    #[error("district '{0}' has no streets")]
    EmptyDistrict(String),

    #[error("street '{street}' appears more than once in district '{district}'")]
    DuplicateStreet { district: String, street: String },

    #[error("invalid sleep interval {0}: must be a non-negative number of seconds")]
    InvalidSleepInterval(f64),

    #[error("retry period must be at least one second")]
    InvalidRetryPeriod,

    #[error("unknown transport '{0}', expected 'mqtt' or 'websocket'")]
    UnknownTransport(String),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("mqtt connection error: {0}")]
    Mqtt(#[from] rumqttc::ConnectionError),

    #[error("connection rejected by broker: {0}")]
    Rejected(String),

    #[error("connection attempt timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("connection closed before handshake completed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("payload has no 'time_sleep' key")]
    MissingSleep,

    #[error("'time_sleep' must be a non-negative number, got {0}")]
    InvalidSleep(String),
}
