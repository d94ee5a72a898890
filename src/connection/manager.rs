//! Connection manager
//!
//! Owns the one logical connection to the broker. The lifecycle is a plain
//! two-state machine driven by three inputs:
//!
//! - a successful connect attempt: `Disconnected -> Connected`, subscribe to
//!   the control topic, flush the offline buffer
//! - a disconnect event from the transport: `Connected -> Disconnected`
//! - a retry tick: while `Disconnected`, make one connect attempt
//!
//! Retries happen on a fixed period with no backoff and no attempt cap.
//! Connect failures, rejections included, are logged and swallowed; the next
//! tick tries again. The first tick fires immediately and serves as the
//! initial connect.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::connection::publisher::Publisher;
use crate::connection::state::ConnectivityState;
use crate::control::{CONTROL_TOPIC, ControlListener};
use crate::transport::{Endpoint, Link, Transport, TransportEvent};

pub struct ConnectionManager {
    transport: Arc<dyn Transport>,
    endpoint: Endpoint,
    publisher: Publisher,
    control: ControlListener,
    retry_period: Duration,
}

impl ConnectionManager {
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoint: Endpoint,
        publisher: Publisher,
        control: ControlListener,
        retry_period: Duration,
    ) -> Self {
        Self {
            transport,
            endpoint,
            publisher,
            control,
            retry_period,
        }
    }

    pub fn state(&self) -> ConnectivityState {
        self.publisher.state()
    }

    /// Makes one connection attempt. Returns whether the session is now
    /// connected on the new link; failures are logged, never raised.
    pub async fn connect(&self) -> bool {
        match self.transport.connect(&self.endpoint).await {
            Ok(link) => self.establish(link),
            Err(e) => {
                warn!(
                    "Failed to connect to {} over {}: {e}",
                    self.endpoint.address(),
                    self.transport.name()
                );
                false
            }
        }
    }

    fn establish(&self, link: Link) -> bool {
        let Link { outbound, events } = link;

        let attached = self.publisher.session().attach(outbound, CONTROL_TOPIC);
        let Some(attached) = attached else {
            debug!("Link unusable or publisher closed, releasing it");
            return false;
        };

        info!(
            "Connected to broker at {} over {}",
            self.endpoint.address(),
            self.transport.name()
        );
        if attached.flushed > 0 {
            info!("Flushed {} buffered readings", attached.flushed);
        }

        tokio::spawn(pump_events(
            self.publisher.clone(),
            self.control.clone(),
            events,
            attached.generation,
        ));
        true
    }

    /// Marks the session disconnected immediately, whatever the cause.
    pub fn on_disconnect(&self) {
        self.publisher.session().force_disconnect();
        info!("Disconnected from broker");
    }

    /// Retries the connection every `retry_period` while disconnected, until
    /// `cancel` fires. On the way out the publisher is closed, which releases
    /// the link and lets the transport disconnect cleanly.
    pub async fn reconnect_loop(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.retry_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if self.state() == ConnectivityState::Connected {
                        continue;
                    }
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = self.connect() => {}
                    }
                }
            }
        }

        let abandoned = self.publisher.close();
        if abandoned > 0 {
            warn!("Shutting down with {abandoned} buffered readings undelivered");
        }
        info!("Connection manager stopped");
    }
}

/// Routes link events until the link goes away, then detaches it.
async fn pump_events(
    publisher: Publisher,
    control: ControlListener,
    mut events: UnboundedReceiver<TransportEvent>,
    generation: u64,
) {
    let reason = loop {
        match events.recv().await {
            Some(TransportEvent::Message { topic, payload }) => {
                if topic == CONTROL_TOPIC {
                    control.handle(&payload);
                } else {
                    debug!("Ignoring message on {topic}");
                }
            }
            Some(TransportEvent::Disconnected { reason }) => break reason,
            None => break "link closed".to_string(),
        }
    };

    if publisher.session().detach(generation) {
        warn!("Disconnected from broker: {reason}");
    }
}
