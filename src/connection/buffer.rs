//! Offline buffer
//!
//! Readings produced while disconnected wait here in `safe_publish` call
//! order. The buffer is unbounded and in-memory only: whatever it holds when
//! the process stops is lost.

use std::collections::VecDeque;

use crate::sensors::Reading;

#[derive(Debug, Clone, PartialEq)]
pub struct BufferedMessage {
    pub topic: String,
    pub reading: Reading,
}

impl BufferedMessage {
    pub fn new(topic: impl Into<String>, reading: Reading) -> Self {
        Self {
            topic: topic.into(),
            reading,
        }
    }
}

#[derive(Debug, Default)]
pub struct OfflineBuffer {
    queue: VecDeque<BufferedMessage>,
}

impl OfflineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_back(&mut self, message: BufferedMessage) {
        self.queue.push_back(message);
    }

    pub fn pop_front(&mut self) -> Option<BufferedMessage> {
        self.queue.pop_front()
    }

    /// Returns a message taken by `pop_front` that could not be delivered.
    pub fn push_front(&mut self, message: BufferedMessage) {
        self.queue.push_front(message);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        dropped
    }

    pub fn iter(&self) -> impl Iterator<Item = &BufferedMessage> {
        self.queue.iter()
    }
}
