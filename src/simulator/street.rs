//! Street simulator
//!
//! Each cycle emits one reading per sensor kind, in topology order, through
//! the publisher, then sleeps for the sleep interval read fresh from the
//! runtime configuration. A control update therefore applies from the next
//! sleep on, never in the middle of a cycle.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::connection::Publisher;
use crate::control::RuntimeConfig;
use crate::sensors::{Reading, SensorSpec, sensor_topic};

pub struct StreetSimulator {
    district: String,
    street: String,
    sensors: Arc<Vec<SensorSpec>>,
    topics: Vec<String>,
    publisher: Publisher,
    runtime: RuntimeConfig,
    rng: StdRng,
}

impl StreetSimulator {
    pub fn new(
        district: &str,
        street: &str,
        sensors: Arc<Vec<SensorSpec>>,
        publisher: Publisher,
        runtime: RuntimeConfig,
    ) -> Self {
        let topics = sensors
            .iter()
            .map(|spec| sensor_topic(district, street, &spec.kind))
            .collect();
        Self {
            district: district.to_string(),
            street: street.to_string(),
            sensors,
            topics,
            publisher,
            runtime,
            rng: StdRng::from_entropy(),
        }
    }

    /// Replaces the entropy-seeded generator with a deterministic one.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Emits one reading per sensor kind. Returns how many were emitted.
    pub fn run_cycle(&mut self) -> usize {
        for (spec, topic) in self.sensors.iter().zip(&self.topics) {
            let value = spec.sample(&mut self.rng);
            debug!("[{topic}] {value} {}", spec.unit.as_deref().unwrap_or(""));
            self.publisher
                .safe_publish(topic.clone(), Reading::now(value, spec.unit.clone()));
        }
        self.sensors.len()
    }

    /// Cycles until `cancel` fires.
    pub async fn run(mut self, cancel: CancellationToken) {
        loop {
            self.run_cycle();

            let pause = self.runtime.sleep_interval();
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(pause) => {}
            }
            if pause.is_zero() {
                tokio::task::yield_now().await;
            }
        }
        debug!("Street {}/{} stopped", self.district, self.street);
    }
}
