//! The `simulator` module runs the fleet.
//!
//! - `street`: one perpetual loop per (district, street) pair.
//! - `fleet`: starts every street loop from the topology and stops them all
//!   together.

pub mod fleet;
pub mod street;

pub use fleet::Fleet;
pub use street::StreetSimulator;

#[cfg(test)]
mod tests;
