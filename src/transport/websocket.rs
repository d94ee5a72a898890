//! WebSocket transport
//!
//! Connects to a PopSub broker and speaks its JSON protocol:
//! - with credentials: `login` -> `login_response{token}` -> `auth{token}`
//!   -> `authenticated`; an `error` reply at either step is a rejection
//! - without credentials the handshake is skipped and the broker decides
//! - `subscribe` / `publish` frames for outbound commands
//! - inbound `message` frames become `TransportEvent::Message`
//!
//! After the handshake one task owns the socket: it forwards outbound
//! commands, decodes inbound frames, and reports `Disconnected` exactly once
//! when the socket fails or the broker closes it. When the outbound sender is
//! dropped the task sends a close frame and exits without reporting.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};
use tungstenite::protocol::Message as WsMessage;

use futures::future::BoxFuture;

use crate::config::Credentials;
use crate::transport::message::{ClientMessage, ServerMessage};
use crate::transport::{Endpoint, Link, Outbound, Transport, TransportEvent};
use crate::utils::error::TransportError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Default, Clone, Copy)]
pub struct WebSocketTransport;

impl Transport for WebSocketTransport {
    fn connect<'a>(&'a self, endpoint: &'a Endpoint) -> BoxFuture<'a, Result<Link, TransportError>> {
        Box::pin(async move {
            let limit = endpoint.connect_timeout;
            tokio::time::timeout(limit, handshake(endpoint))
                .await
                .map_err(|_| TransportError::Timeout(limit))?
        })
    }

    fn name(&self) -> &'static str {
        "websocket"
    }
}

async fn handshake(endpoint: &Endpoint) -> Result<Link, TransportError> {
    let url = format!("ws://{}", endpoint.address());
    let (mut ws, _response) = connect_async(url.as_str()).await?;

    if let Some(credentials) = &endpoint.credentials {
        authenticate(&mut ws, credentials).await?;
        info!("Authenticated to {url} as {}", credentials.username);
    }

    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    tokio::spawn(run_link(ws, outbound_rx, events_tx));

    Ok(Link {
        outbound: outbound_tx,
        events: events_rx,
    })
}

async fn authenticate(ws: &mut WsStream, credentials: &Credentials) -> Result<(), TransportError> {
    send_frame(
        ws,
        &ClientMessage::Login {
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        },
    )
    .await?;

    let token = match next_server_message(ws).await? {
        ServerMessage::LoginResponse { token } => token,
        ServerMessage::Error { message } => return Err(TransportError::Rejected(message)),
        other => {
            return Err(TransportError::Protocol(format!(
                "expected login_response, got {other:?}"
            )));
        }
    };

    send_frame(ws, &ClientMessage::Auth { token }).await?;

    match next_server_message(ws).await? {
        ServerMessage::Authenticated {} => Ok(()),
        ServerMessage::Error { message } => Err(TransportError::Rejected(message)),
        other => Err(TransportError::Protocol(format!(
            "expected authenticated, got {other:?}"
        ))),
    }
}

async fn send_frame(ws: &mut WsStream, frame: &ClientMessage) -> Result<(), TransportError> {
    let text =
        serde_json::to_string(frame).map_err(|e| TransportError::Protocol(e.to_string()))?;
    ws.send(WsMessage::Text(text.into())).await?;
    Ok(())
}

async fn next_server_message(ws: &mut WsStream) -> Result<ServerMessage, TransportError> {
    while let Some(frame) = ws.next().await {
        let frame = frame?;
        if frame.is_close() {
            return Err(TransportError::Closed);
        }
        if frame.is_text() {
            let text = frame.to_text()?;
            return serde_json::from_str(text).map_err(|e| TransportError::Protocol(e.to_string()));
        }
    }
    Err(TransportError::Closed)
}

fn encode(command: Outbound) -> ClientMessage {
    match command {
        Outbound::Publish { topic, payload } => ClientMessage::Publish {
            topic,
            payload: String::from_utf8_lossy(&payload).into_owned(),
            message_id: None,
            qos: Some(0),
        },
        Outbound::Subscribe { topic } => ClientMessage::Subscribe { topic },
    }
}

async fn run_link(
    ws: WsStream,
    mut outbound: UnboundedReceiver<Outbound>,
    events: UnboundedSender<TransportEvent>,
) {
    let (mut sink, mut stream) = ws.split();

    let reason = loop {
        tokio::select! {
            command = outbound.recv() => match command {
                Some(command) => {
                    let text = match serde_json::to_string(&encode(command)) {
                        Ok(json) => json,
                        Err(e) => {
                            warn!("Failed to serialize outbound frame: {e}");
                            continue;
                        }
                    };
                    if let Err(e) = sink.send(WsMessage::Text(text.into())).await {
                        break e.to_string();
                    }
                }
                None => {
                    if let Err(e) = sink.close().await {
                        debug!("Close handshake failed: {e}");
                    }
                    debug!("WebSocket link released");
                    return;
                }
            },
            frame = stream.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    match serde_json::from_str::<ServerMessage>(text.as_str()) {
                        Ok(ServerMessage::Message { topic, payload, .. }) => {
                            let _ = events.send(TransportEvent::Message {
                                topic,
                                payload: payload.into_bytes(),
                            });
                        }
                        Ok(ServerMessage::Error { message }) => {
                            warn!("Broker reported an error: {message}");
                        }
                        Ok(other) => debug!("Ignoring frame {other:?}"),
                        Err(e) => warn!(
                            "Invalid frame from broker: {e} | {}",
                            text.as_str().chars().take(100).collect::<String>()
                        ),
                    }
                }
                Some(Ok(WsMessage::Close(_))) | None => break "closed by broker".to_string(),
                Some(Ok(_)) => {}
                Some(Err(e)) => break e.to_string(),
            },
        }
    };

    let _ = events.send(TransportEvent::Disconnected { reason });
}
