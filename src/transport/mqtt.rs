//! MQTT transport
//!
//! Thin adapter over `rumqttc`. A connect attempt builds a fresh client and
//! event loop and polls until the broker answers with CONNACK; a refused
//! CONNACK (bad credentials, not authorized) is reported as a rejection.
//!
//! Once connected, two tasks serve the link:
//! - the forwarder turns `Outbound` commands into client requests. Publishes
//!   use QoS 0, so a request lost with a dying socket is not retried.
//! - the driver polls the event loop, forwards incoming publishes and
//!   reports `Disconnected` when the connection fails.
//!
//! The event loop is dropped on the first error instead of letting `rumqttc`
//! reconnect on its own: reconnection is owned by the connection manager.

use futures::future::BoxFuture;
use rumqttc::{
    AsyncClient, ConnectReturnCode, ConnectionError, Event, EventLoop, MqttOptions, Outgoing,
    Packet, QoS,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::transport::{Endpoint, Link, Outbound, Transport, TransportEvent};
use crate::utils::error::TransportError;

#[derive(Debug, Clone)]
pub struct MqttTransport {
    /// Capacity of the client request queue in front of the event loop.
    request_capacity: usize,
}

impl Default for MqttTransport {
    fn default() -> Self {
        Self {
            request_capacity: 1024,
        }
    }
}

impl MqttTransport {
    pub fn with_capacity(request_capacity: usize) -> Self {
        Self { request_capacity }
    }
}

impl Transport for MqttTransport {
    fn connect<'a>(&'a self, endpoint: &'a Endpoint) -> BoxFuture<'a, Result<Link, TransportError>> {
        Box::pin(async move {
            let mut options = MqttOptions::new(
                endpoint.client_id.clone(),
                endpoint.host.clone(),
                endpoint.port,
            );
            options.set_keep_alive(endpoint.keep_alive);
            options.set_clean_session(true);
            if let Some(credentials) = &endpoint.credentials {
                options.set_credentials(
                    credentials.username.clone(),
                    credentials.password.clone(),
                );
            }

            let (client, mut event_loop) = AsyncClient::new(options, self.request_capacity);

            let limit = endpoint.connect_timeout;
            tokio::time::timeout(limit, await_connack(&mut event_loop))
                .await
                .map_err(|_| TransportError::Timeout(limit))??;

            let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
            let (events_tx, events_rx) = mpsc::unbounded_channel();
            tokio::spawn(forward_outbound(client, outbound_rx));
            tokio::spawn(drive_event_loop(event_loop, events_tx));

            Ok(Link {
                outbound: outbound_tx,
                events: events_rx,
            })
        })
    }

    fn name(&self) -> &'static str {
        "mqtt"
    }
}

async fn await_connack(event_loop: &mut EventLoop) -> Result<(), TransportError> {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                return match ack.code {
                    ConnectReturnCode::Success => Ok(()),
                    code => Err(TransportError::Rejected(format!("{code:?}"))),
                };
            }
            Ok(_) => {}
            Err(ConnectionError::ConnectionRefused(code)) => {
                return Err(TransportError::Rejected(format!("{code:?}")));
            }
            Err(e) => return Err(e.into()),
        }
    }
}

async fn forward_outbound(client: AsyncClient, mut outbound: UnboundedReceiver<Outbound>) {
    while let Some(command) = outbound.recv().await {
        let result = match command {
            Outbound::Publish { topic, payload } => {
                client.publish(topic, QoS::AtMostOnce, false, payload).await
            }
            Outbound::Subscribe { topic } => client.subscribe(topic, QoS::AtMostOnce).await,
        };
        if let Err(e) = result {
            warn!("MQTT request dropped: {e}");
        }
    }

    // Sender dropped: the link was released.
    if let Err(e) = client.disconnect().await {
        debug!("MQTT disconnect request not delivered: {e}");
    }
}

async fn drive_event_loop(mut event_loop: EventLoop, events: UnboundedSender<TransportEvent>) {
    let reason = loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let _ = events.send(TransportEvent::Message {
                    topic: publish.topic,
                    payload: publish.payload.to_vec(),
                });
            }
            Ok(Event::Incoming(Packet::Disconnect)) => break "disconnected by broker".to_string(),
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                debug!("MQTT link released");
                return;
            }
            Ok(_) => {}
            Err(e) => break e.to_string(),
        }
    };

    let _ = events.send(TransportEvent::Disconnected { reason });
}
