//! Publisher facade
//!
//! `Publisher` is cloned into every simulator loop. `safe_publish` never
//! fails and never blocks on the network: under the session lock it either
//! pushes the reading onto the live link or appends it to the offline buffer.
//! Because flushes run under the same lock, a reading published while a
//! flush is in progress lands after every message already buffered.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::connection::buffer::BufferedMessage;
use crate::connection::session::Session;
use crate::connection::state::ConnectivityState;
use crate::sensors::Reading;

#[derive(Debug, Clone, Default)]
pub struct Publisher {
    session: Arc<Mutex<Session>>,
}

impl Publisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn safe_publish(&self, topic: impl Into<String>, reading: Reading) {
        self.session().publish(BufferedMessage::new(topic, reading));
    }

    pub fn state(&self) -> ConnectivityState {
        self.session().state()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectivityState::Connected
    }

    /// Number of readings waiting for the next connect.
    pub fn buffered(&self) -> usize {
        self.session().buffered()
    }

    /// Stops accepting readings and releases the link; buffered readings are
    /// abandoned and their count returned.
    pub fn close(&self) -> usize {
        self.session().close()
    }

    pub(crate) fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
