//! Live reconfiguration.
//!
//! `RuntimeConfig` holds the values simulator loops read on every cycle;
//! `ControlListener` applies payloads pushed on the control topic to it.

pub mod listener;
pub mod runtime;

pub use listener::{CONTROL_TOPIC, ControlListener};
pub use runtime::RuntimeConfig;
