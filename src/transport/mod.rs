//! The `transport` module adapts concrete broker protocols to the small
//! event-driven interface the connection manager drives.
//!
//! A successful [`Transport::connect`] yields a [`Link`]:
//!
//! - `outbound`: an unbounded channel of [`Outbound`] commands. Pushing into
//!   it never blocks, which lets the connection manager hand messages over
//!   while it holds the session lock. Dropping the sender asks the adapter to
//!   close the connection cleanly.
//! - `events`: an unbounded channel of [`TransportEvent`]s raised by the
//!   adapter's I/O task (control messages, disconnects).
//!
//! Two adapters are provided:
//!
//! - `mqtt`: MQTT 3.1.1 via `rumqttc`.
//! - `websocket`: the PopSub JSON protocol over WebSockets.

pub mod message;
pub mod mqtt;
pub mod websocket;

#[cfg(test)]
pub(crate) mod mock;



use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::config::{BrokerSettings, Credentials, TransportKind};
use crate::utils::error::TransportError;

pub use mqtt::MqttTransport;
pub use websocket::WebSocketTransport;

/// Where and how to reach the broker.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub credentials: Option<Credentials>,
    pub keep_alive: Duration,
    pub connect_timeout: Duration,
}

impl Endpoint {
    pub fn from_settings(settings: &BrokerSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            client_id: settings.client_id.clone(),
            credentials: settings.credentials.clone(),
            keep_alive: settings.keep_alive,
            connect_timeout: settings.connect_timeout,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Commands the connection manager sends down a live link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Publish { topic: String, payload: Vec<u8> },
    Subscribe { topic: String },
}

/// Events an adapter raises while a link is up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Message { topic: String, payload: Vec<u8> },
    Disconnected { reason: String },
}

/// One established connection.
#[derive(Debug)]
pub struct Link {
    pub outbound: UnboundedSender<Outbound>,
    pub events: UnboundedReceiver<TransportEvent>,
}

pub trait Transport: Send + Sync {
    /// Makes one connection attempt, including authentication.
    fn connect<'a>(&'a self, endpoint: &'a Endpoint) -> BoxFuture<'a, Result<Link, TransportError>>;

    fn name(&self) -> &'static str;
}

pub fn build_transport(kind: TransportKind) -> Arc<dyn Transport> {
    match kind {
        TransportKind::Mqtt => Arc::new(MqttTransport::default()),
        TransportKind::WebSocket => Arc::new(WebSocketTransport),
    }
}
