//! WebSocket connection and event loop.
//!
//! This module owns the socket to the host. [`Connection::open`] spawns
//! one tokio task that connects, then runs the event loop:
//!
//! - Inbound text frames are passed to the [`FrameHandler`]; a returned
//!   reply is written before the next frame is read
//! - Outbound messages queued through [`Connection::send`] are written
//!   in order
//! - Every transport outcome is reported to the [`Lifecycle`]
//!
//! The socket never leaves the task.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{Instrument, Span, debug, trace, warn};

use crate::bootstrap::ConnectionTarget;
use crate::error::{Error, Result};
use crate::protocol::OutboundMessage;

use super::lifecycle::{Lifecycle, LifecycleEvent};

// ============================================================================
// Types
// ============================================================================

/// Socket type produced by the client handshake.
type HostStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Write half of the socket.
type HostSink = SplitSink<HostStream, Message>;

/// Inbound text frame callback.
///
/// Called once per text frame, in order. Return `Some(message)` to send
/// a reply before the next frame is processed.
pub type FrameHandler = Box<dyn Fn(&str) -> Option<OutboundMessage> + Send + Sync>;

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Write a message.
    Send(OutboundMessage),
    /// Close the socket.
    Shutdown,
}

// ============================================================================
// Connection
// ============================================================================

/// Handle to the connection task.
///
/// Cheap to clone. Dropping every clone closes the socket.
#[derive(Clone)]
pub struct Connection {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
}

impl Connection {
    /// Starts connecting to `target` and returns immediately.
    ///
    /// Establishment, failure and closure are reported through
    /// `lifecycle`. The task runs inside `span`.
    pub(crate) fn open(
        target: ConnectionTarget,
        connect_timeout: Option<Duration>,
        handler: FrameHandler,
        lifecycle: Arc<Lifecycle>,
        span: Span,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        tokio::spawn(
            Self::run(target, connect_timeout, handler, lifecycle, command_rx).instrument(span),
        );

        Self { command_tx }
    }

    /// Queues a message for the event loop.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the event loop has exited.
    pub fn send(&self, message: OutboundMessage) -> Result<()> {
        self.command_tx
            .send(ConnectionCommand::Send(message))
            .map_err(|_| Error::ConnectionClosed)
    }

    /// Asks the event loop to close the socket.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(ConnectionCommand::Shutdown);
    }

    /// Connection task: handshake, event loop, final close.
    async fn run(
        target: ConnectionTarget,
        connect_timeout: Option<Duration>,
        handler: FrameHandler,
        lifecycle: Arc<Lifecycle>,
        command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
    ) {
        match Self::establish(&target, connect_timeout).await {
            Ok(ws_stream) => {
                lifecycle.fire(LifecycleEvent::Opened);
                Self::run_event_loop(ws_stream, command_rx, &handler, &lifecycle).await;
            }
            Err(e) => {
                lifecycle.fire(LifecycleEvent::errored(e.to_string()));
            }
        }

        lifecycle.fire(LifecycleEvent::Closed);
        debug!("Connection task terminated");
    }

    /// Performs the WebSocket handshake, bounded by `connect_timeout`.
    async fn establish(
        target: &ConnectionTarget,
        connect_timeout: Option<Duration>,
    ) -> Result<HostStream> {
        let handshake = connect_async(target.request_url());

        let result = match connect_timeout {
            Some(limit) => timeout(limit, handshake)
                .await
                .map_err(|_| {
                    let waited_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
                    Error::connection_timeout(waited_ms)
                })?,
            None => handshake.await,
        };

        let (ws_stream, response) =
            result.map_err(|e| Error::connection(format!("WebSocket handshake failed: {e}")))?;

        debug!(status = %response.status(), "WebSocket handshake completed");

        Ok(ws_stream)
    }

    /// Event loop that handles WebSocket I/O.
    async fn run_event_loop(
        ws_stream: HostStream,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        handler: &FrameHandler,
        lifecycle: &Lifecycle,
    ) {
        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                // Incoming frames from the host
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            if let Some(reply) = handler(text.as_str())
                                && !Self::deliver(&mut ws_write, &reply, lifecycle).await
                            {
                                break;
                            }
                        }

                        Some(Ok(Message::Binary(data))) => {
                            warn!(len = data.len(), "Invalid message received: non-text frame dropped");
                        }

                        Some(Ok(Message::Close(frame))) => {
                            debug!(?frame, "WebSocket closed by host");
                            // Flushes the queued close reply
                            if let Err(e) = ws_write.close().await {
                                debug!(error = %e, "Close handshake not completed");
                            }
                            break;
                        }

                        Some(Err(e)) => {
                            lifecycle.fire(LifecycleEvent::errored(e.to_string()));
                            break;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }

                        // Ping/Pong are answered by tungstenite
                        Some(Ok(_)) => {}
                    }
                }

                // Commands from the client handle
                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send(message)) => {
                            if !Self::deliver(&mut ws_write, &message, lifecycle).await {
                                break;
                            }
                        }

                        Some(ConnectionCommand::Shutdown) => {
                            debug!("Shutdown command received");
                            let _ = ws_write.close().await;
                            break;
                        }

                        None => {
                            debug!("Command channel closed");
                            let _ = ws_write.close().await;
                            break;
                        }
                    }
                }
            }
        }

        debug!("Event loop terminated");
    }

    /// Writes `message`, returning `false` once the socket is unusable.
    ///
    /// A message that cannot be encoded is dropped and the loop goes on.
    async fn deliver(
        ws_write: &mut HostSink,
        message: &OutboundMessage,
        lifecycle: &Lifecycle,
    ) -> bool {
        match Self::write_message(ws_write, message).await {
            Ok(()) => true,
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, request_id = %message.id, "Dropping unencodable message");
                true
            }
            Err(e) => {
                lifecycle.fire(LifecycleEvent::errored(e.to_string()));
                false
            }
        }
    }

    /// Serializes and writes one message as a single text frame.
    async fn write_message(ws_write: &mut HostSink, message: &OutboundMessage) -> Result<()> {
        let json = message.to_frame()?;
        ws_write.send(Message::Text(json.into())).await?;

        trace!(request_id = %message.id, event = %message.data.event, "Message sent");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
