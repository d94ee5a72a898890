//! Session state
//!
//! `Session` is the single authoritative record of connectivity. It owns the
//! link handle of the current connection and the offline buffer, and it is
//! only ever touched through the publisher's mutex.
//!
//! Each attached link gets a generation number. Disconnect reports carry the
//! generation of the link they belong to, so a late report from a link that
//! was already replaced cannot knock the current one offline.

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, trace, warn};

use crate::connection::buffer::{BufferedMessage, OfflineBuffer};
use crate::connection::state::ConnectivityState;
use crate::transport::Outbound;

#[derive(Debug, Default)]
pub struct Session {
    state: ConnectivityState,
    link: Option<UnboundedSender<Outbound>>,
    generation: u64,
    buffer: OfflineBuffer,
    closed: bool,
}

/// Result of a successful `Session::attach`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attached {
    pub generation: u64,
    pub flushed: usize,
}

impl Session {
    pub fn state(&self) -> ConnectivityState {
        self.state
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn buffer(&self) -> &OfflineBuffer {
        &self.buffer
    }

    /// Transition to `Connected` on a fresh link: subscribe to
    /// `control_topic`, then drain the buffer in order.
    ///
    /// Returns `None` once the session is closed, or when the link turns out
    /// to be dead before the flush completes; the session is then left
    /// `Disconnected` with the unsent messages still buffered.
    pub fn attach(
        &mut self,
        link: UnboundedSender<Outbound>,
        control_topic: &str,
    ) -> Option<Attached> {
        if self.closed {
            return None;
        }

        self.generation += 1;
        let subscribe = Outbound::Subscribe {
            topic: control_topic.to_string(),
        };
        if link.send(subscribe).is_err() {
            self.drop_link();
            return None;
        }
        self.link = Some(link);
        self.state = ConnectivityState::Connected;

        let flushed = self.flush();
        if self.state != ConnectivityState::Connected {
            return None;
        }
        Some(Attached {
            generation: self.generation,
            flushed,
        })
    }

    /// Transition to `Disconnected` if `generation` is still the live link.
    pub fn detach(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.state == ConnectivityState::Disconnected {
            return false;
        }
        self.drop_link();
        true
    }

    /// Transition to `Disconnected` whatever the current link.
    pub fn force_disconnect(&mut self) {
        self.drop_link();
    }

    /// Send directly when connected, otherwise append to the buffer.
    pub fn publish(&mut self, message: BufferedMessage) {
        if self.closed {
            debug!("Publisher closed, dropping reading for {}", message.topic);
            return;
        }

        if self.state == ConnectivityState::Connected {
            match self.hand_off(&message) {
                HandOff::Sent => return,
                HandOff::Unencodable => return,
                HandOff::LinkGone => {
                    warn!("Link closed under us, buffering {}", message.topic);
                    self.drop_link();
                }
            }
        }

        trace!("Buffering {} ({} queued)", message.topic, self.buffer.len() + 1);
        self.buffer.push_back(message);
    }

    /// Stop accepting publishes and release the link. Returns how many
    /// buffered messages were abandoned.
    pub fn close(&mut self) -> usize {
        self.closed = true;
        self.drop_link();
        self.buffer.clear()
    }

    fn flush(&mut self) -> usize {
        let mut sent = 0;
        while let Some(message) = self.buffer.pop_front() {
            match self.hand_off(&message) {
                HandOff::Sent => sent += 1,
                HandOff::Unencodable => {}
                HandOff::LinkGone => {
                    self.buffer.push_front(message);
                    self.drop_link();
                    break;
                }
            }
        }
        sent
    }

    fn hand_off(&self, message: &BufferedMessage) -> HandOff {
        let Some(link) = &self.link else {
            return HandOff::LinkGone;
        };

        let payload = match serde_json::to_vec(&message.reading) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to serialize reading for {}: {e}", message.topic);
                return HandOff::Unencodable;
            }
        };

        let command = Outbound::Publish {
            topic: message.topic.clone(),
            payload,
        };
        match link.send(command) {
            Ok(()) => HandOff::Sent,
            Err(_) => HandOff::LinkGone,
        }
    }

    fn drop_link(&mut self) {
        self.state = ConnectivityState::Disconnected;
        self.link = None;
    }
}

enum HandOff {
    Sent,
    Unencodable,
    LinkGone,
}
