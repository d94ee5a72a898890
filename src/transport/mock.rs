//! In-process transport for tests.
//!
//! `MockTransport` fails a configurable number of connect attempts, then
//! hands out links whose far ends (`BrokerSide`) are kept for the test to
//! inspect outbound traffic and inject events.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::BoxFuture;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::sensors::Reading;
use crate::transport::{Endpoint, Link, Outbound, Transport, TransportEvent};
use crate::utils::error::TransportError;

#[derive(Default)]
pub(crate) struct MockTransport {
    failures_remaining: AtomicUsize,
    dead_remaining: AtomicUsize,
    attempts: AtomicUsize,
    links: Mutex<VecDeque<BrokerSide>>,
}

pub(crate) struct BrokerSide {
    pub received: UnboundedReceiver<Outbound>,
    pub events: UnboundedSender<TransportEvent>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(failures: usize) -> Self {
        let transport = Self::default();
        transport.fail_next(failures);
        transport
    }

    pub fn fail_next(&self, failures: usize) {
        self.failures_remaining.store(failures, Ordering::SeqCst);
    }

    /// The next `count` connects succeed but hand out links whose broker
    /// side is already gone.
    pub fn dead_next(&self, count: usize) {
        self.dead_remaining.store(count, Ordering::SeqCst);
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Oldest link not yet taken by the test.
    pub fn take_link(&self) -> Option<BrokerSide> {
        self.links.lock().unwrap().pop_front()
    }

    pub fn pending_links(&self) -> usize {
        self.links.lock().unwrap().len()
    }
}

impl Transport for MockTransport {
    fn connect<'a>(&'a self, _endpoint: &'a Endpoint) -> BoxFuture<'a, Result<Link, TransportError>> {
        Box::pin(async move {
            self.attempts.fetch_add(1, Ordering::SeqCst);

            let failed = self
                .failures_remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failed {
                return Err(TransportError::Rejected("not authorized".to_string()));
            }

            let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
            let (events_tx, events_rx) = mpsc::unbounded_channel();

            let dead = self
                .dead_remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if dead {
                drop(outbound_rx);
                drop(events_tx);
                return Ok(Link {
                    outbound: outbound_tx,
                    events: events_rx,
                });
            }

            self.links.lock().unwrap().push_back(BrokerSide {
                received: outbound_rx,
                events: events_tx,
            });

            Ok(Link {
                outbound: outbound_tx,
                events: events_rx,
            })
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

impl BrokerSide {
    /// Everything sent down the link so far.
    pub fn drain(&mut self) -> Vec<Outbound> {
        let mut out = Vec::new();
        while let Ok(command) = self.received.try_recv() {
            out.push(command);
        }
        out
    }

    /// Published `(topic, reading)` pairs, skipping subscriptions.
    pub fn published(&mut self) -> Vec<(String, Reading)> {
        self.drain()
            .into_iter()
            .filter_map(|command| match command {
                Outbound::Publish { topic, payload } => {
                    Some((topic, serde_json::from_slice(&payload).unwrap()))
                }
                Outbound::Subscribe { .. } => None,
            })
            .collect()
    }

    pub fn deliver(&self, topic: &str, payload: &str) {
        self.events
            .send(TransportEvent::Message {
                topic: topic.to_string(),
                payload: payload.as_bytes().to_vec(),
            })
            .unwrap();
    }

    pub fn disconnect(&self) {
        self.events
            .send(TransportEvent::Disconnected {
                reason: "broker went away".to_string(),
            })
            .unwrap();
    }
}

pub(crate) fn endpoint() -> Endpoint {
    Endpoint {
        host: "127.0.0.1".to_string(),
        port: 1883,
        client_id: "test".to_string(),
        credentials: None,
        keep_alive: std::time::Duration::from_secs(30),
        connect_timeout: std::time::Duration::from_secs(1),
    }
}
