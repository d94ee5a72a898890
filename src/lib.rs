//! # smartcity-sim
//!
//! `smartcity-sim` simulates a fleet of smart-city environmental sensors
//! and publishes their readings to a message broker. Every street of every
//! district runs its own loop; readings produced while the broker is
//! unreachable are buffered and flushed in order on reconnect.
//!
//! ## Core Modules
//!
//! - `config`: Loads settings from defaults, a TOML file and the environment.
//! - `connection`: The connection manager, offline buffer and publish gate.
//! - `control`: The `smartcity/config` control topic and the shared sleep interval.
//! - `sensors`: Sensor catalog, readings and the city topology.
//! - `simulator`: Per-street simulator loops and the fleet that runs them.
//! - `transport`: MQTT and WebSocket adapters behind one `Transport` trait.
//! - `utils`: Error types and logging bootstrap.

pub mod config;
pub mod connection;
pub mod control;
pub mod sensors;
pub mod simulator;
pub mod transport;
pub mod utils;
