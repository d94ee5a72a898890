//! The `utils` module provides a collection of utility functions and common
//! definitions used across the simulator.
//!
//! This module centralizes the error types and the logging bootstrap so every
//! other module reports failures and events the same way.

pub mod error;
pub mod logging;
