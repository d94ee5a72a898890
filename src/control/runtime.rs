use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Shared, injectable runtime configuration.
///
/// Cloning is cheap and every clone observes the same value. Readers take a
/// short read lock, the control listener is the only writer; last write wins.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    sleep_interval: Arc<RwLock<Duration>>,
}

impl RuntimeConfig {
    pub fn new(sleep_interval: Duration) -> Self {
        Self {
            sleep_interval: Arc::new(RwLock::new(sleep_interval)),
        }
    }

    pub fn sleep_interval(&self) -> Duration {
        *self
            .sleep_interval
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_sleep_interval(&self, interval: Duration) {
        *self
            .sleep_interval
            .write()
            .unwrap_or_else(PoisonError::into_inner) = interval;
    }
}
