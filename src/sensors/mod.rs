//! The `sensors` module describes what the fleet simulates.
//!
//! - `catalog`: sampling ranges and units for every known sensor kind.
//! - `reading`: the `Reading` payload and the topic naming scheme.
//! - `topology`: the validated district/street/sensor layout built once at
//!   startup and shared read-only by every simulator loop.

pub mod catalog;
pub mod reading;
pub mod topology;

pub use catalog::{Sampling, SensorCatalog, SensorSpec};
pub use reading::{Reading, TOPIC_ROOT, sensor_topic};
pub use topology::{District, Topology};
