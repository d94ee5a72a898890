use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::connection::Publisher;
use crate::control::RuntimeConfig;
use crate::sensors::Topology;
use crate::simulator::street::StreetSimulator;

/// Every street loop of the city, supervised as one unit.
///
/// Loops share one cancellation token: `shutdown` cancels it and waits for
/// every loop to return.
pub struct Fleet {
    tasks: JoinSet<()>,
    cancel: CancellationToken,
}

impl Fleet {
    pub fn spawn(
        topology: &Topology,
        publisher: &Publisher,
        runtime: &RuntimeConfig,
        cancel: CancellationToken,
    ) -> Self {
        let sensors = Arc::new(topology.sensors().to_vec());
        let mut tasks = JoinSet::new();

        for (district, street) in topology.streets() {
            let simulator = StreetSimulator::new(
                district,
                street,
                sensors.clone(),
                publisher.clone(),
                runtime.clone(),
            );
            tasks.spawn(simulator.run(cancel.clone()));
        }

        info!(
            "Started {} street simulators with {} sensors each",
            tasks.len(),
            sensors.len()
        );
        Self { tasks, cancel }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Stops every loop and waits for them to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result {
                warn!("Street simulator task failed: {e}");
            }
        }
        info!("All street simulators stopped");
    }
}
