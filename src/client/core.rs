//! Extension client handle.
//!
//! # Example
//!
//! ```no_run
//! use nl_extension::{ClientOptions, ConnectionParameters, ExtensionClient, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let params = ConnectionParameters::from_stdin()?;
//!     let client = ExtensionClient::connect(params, ClientOptions::new())?;
//!
//!     // Runs until the host goes away
//!     client.closed().await;
//!     Ok(())
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, info_span};

use crate::bootstrap::ConnectionParameters;
use crate::error::{Error, Result};
use crate::identifiers::{ExtensionId, RequestId};
use crate::protocol::OutboundMessage;
use crate::transport::{Connection, ConnectionState, Lifecycle};

use super::dispatch::Dispatcher;
use super::options::ClientOptions;

// ============================================================================
// ExtensionClient
// ============================================================================

/// Handle to the extension's connection with the host.
///
/// Dropping the handle closes the socket.
pub struct ExtensionClient {
    /// Startup parameters.
    params: Arc<ConnectionParameters>,
    /// Command channel into the connection task.
    connection: Connection,
    /// Connection state owner.
    lifecycle: Arc<Lifecycle>,
}

impl ExtensionClient {
    /// Starts connecting to the host and returns immediately.
    ///
    /// The state is `Connecting` until the handshake completes. Must be
    /// called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the connection target is invalid.
    pub fn connect(params: ConnectionParameters, options: ClientOptions) -> Result<Self> {
        let target = params.target(options.host_name())?;
        let span = info_span!("extension", extension_id = %params.extension_id());

        span.in_scope(|| {
            info!(
                host = options.host_name(),
                port = params.host_port(),
                "Connecting to host"
            );
        });

        let lifecycle = Arc::new(Lifecycle::new(options.policy()));
        let dispatcher = Dispatcher::new(
            params.access_token(),
            options.replies(),
            options.policy(),
        );

        let connection = Connection::open(
            target,
            options.timeout(),
            dispatcher.into_frame_handler(),
            Arc::clone(&lifecycle),
            span,
        );

        Ok(Self {
            params: Arc::new(params),
            connection,
            lifecycle,
        })
    }

    /// Returns the extension id.
    #[inline]
    #[must_use]
    pub fn extension_id(&self) -> &ExtensionId {
        self.params.extension_id()
    }

    /// Returns the current connection state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.lifecycle.state()
    }

    /// Broadcasts an event to the host.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] if the connection is not open
    /// - [`Error::ConnectionClosed`] if the connection task has exited
    pub fn send(&self, event: impl Into<String>, payload: Value) -> Result<RequestId> {
        let state = self.state();
        if state != ConnectionState::Open {
            return Err(Error::not_connected(state));
        }

        let message = OutboundMessage::broadcast(self.params.access_token(), event, payload);
        let id = message.id;
        self.connection.send(message)?;
        Ok(id)
    }

    /// Waits until the handshake has completed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the connection failed instead.
    pub async fn opened(&self) -> Result<()> {
        let mut states = self.lifecycle.subscribe();
        let state = states
            .wait_for(|state| *state != ConnectionState::Connecting)
            .await
            .map(|state| *state)
            .unwrap_or(ConnectionState::Closed);

        match state {
            ConnectionState::Open => Ok(()),
            _ => Err(Error::ConnectionClosed),
        }
    }

    /// Waits until the connection is closed.
    ///
    /// This is the extension's exit signal: once it resolves there is
    /// nothing left to do.
    pub async fn closed(&self) -> ConnectionState {
        let mut states = self.lifecycle.subscribe();
        let _ = states.wait_for(|state| state.is_terminal()).await;
        ConnectionState::Closed
    }

    /// Closes the socket.
    ///
    /// The state still moves to `Closed` through the normal path.
    pub fn close(&self) {
        self.connection.shutdown();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use serde_json::json;
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::oneshot;
    use tokio::task::JoinHandle;
    use tokio::time::timeout;
    use tokio_tungstenite::WebSocketStream;
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

    use crate::logging::LogPolicy;

    const STEP: Duration = Duration::from_secs(5);

    /// In-process host: accepts one extension and records the request URI.
    struct TestHost {
        port: u16,
        uri_rx: oneshot::Receiver<String>,
        accepted: JoinHandle<WebSocketStream<TcpStream>>,
    }

    impl TestHost {
        async fn start() -> Self {
            let listener = TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0))
                .await
                .expect("bind");
            let port = listener.local_addr().expect("local addr").port();
            let (uri_tx, uri_rx) = oneshot::channel();

            let accepted = tokio::spawn(async move {
                let (stream, _) = listener.accept().await.expect("accept");
                tokio_tungstenite::accept_hdr_async(stream, |request: &Request, response: Response| {
                    let _ = uri_tx.send(request.uri().to_string());
                    Ok::<Response, ErrorResponse>(response)
                })
                .await
                .expect("upgrade")
            });

            Self {
                port,
                uri_rx,
                accepted,
            }
        }

        fn params(&self) -> ConnectionParameters {
            ConnectionParameters::new(self.port, "T", "C", "E1").expect("valid params")
        }
    }

    fn options() -> ClientOptions {
        ClientOptions::new()
            .host("127.0.0.1")
            .log_policy(LogPolicy::Verbose)
            .connect_timeout(Some(STEP))
    }

    /// Reads the next text frame as JSON.
    async fn next_json(ws: &mut WebSocketStream<TcpStream>) -> Value {
        loop {
            let message = timeout(STEP, ws.next())
                .await
                .expect("frame in time")
                .expect("stream open")
                .expect("valid frame");
            if let Message::Text(text) = message {
                return serde_json::from_str(text.as_str()).expect("json frame");
            }
        }
    }

    async fn send_text(ws: &mut WebSocketStream<TcpStream>, text: &str) {
        ws.send(Message::Text(text.to_string().into()))
            .await
            .expect("host send");
    }

    #[tokio::test]
    async fn test_round_trip_scenario() {
        let host = TestHost::start().await;
        let client = ExtensionClient::connect(host.params(), options()).expect("connect");
        assert_eq!(client.extension_id().as_str(), "E1");

        let mut ws = timeout(STEP, host.accepted).await.expect("accepted").expect("task");
        let uri = host.uri_rx.await.expect("uri recorded");
        assert_eq!(uri, "/?extensionId=E1&connectToken=C");
        timeout(STEP, client.opened()).await.expect("opened").expect("open");

        send_text(&mut ws, r#"{"event":"eventToExtension","data":"hi"}"#).await;
        let reply = next_json(&mut ws).await;

        let id = reply["id"].as_str().expect("id is a string").to_string();
        assert!(uuid::Uuid::parse_str(&id).is_ok());
        assert_eq!(
            reply,
            json!({
                "id": id,
                "method": "app.broadcast",
                "accessToken": "T",
                "data": { "event": "eventFromExtension", "data": "Hello app!" }
            })
        );

        // None of these produce a frame, so the next one is the second reply
        send_text(&mut ws, r#"{"event":"app.broadcast","data":"echo"}"#).await;
        send_text(&mut ws, "garbage").await;
        send_text(&mut ws, r#"{"data":"no event"}"#).await;
        ws.send(Message::Binary(vec![1u8, 2, 3].into()))
            .await
            .expect("host send");
        send_text(&mut ws, r#"{"event":"eventToExtension","data":2}"#).await;

        let second = next_json(&mut ws).await;
        assert_eq!(second["data"]["event"], "eventFromExtension");
        assert_ne!(second["id"], reply["id"]);
        assert_eq!(client.state(), ConnectionState::Open);

        ws.close(None).await.expect("host close");
        let state = timeout(STEP, client.closed()).await.expect("closed in time");
        assert_eq!(state, ConnectionState::Closed);
        assert!(matches!(
            client.send("late", json!(null)),
            Err(Error::NotConnected {
                state: ConnectionState::Closed
            })
        ));
    }

    #[tokio::test]
    async fn test_send_before_open_is_rejected() {
        let host = TestHost::start().await;
        let client = ExtensionClient::connect(host.params(), options()).expect("connect");

        // Nothing has been polled yet on the current-thread runtime
        let err = client.send("early", json!(1)).unwrap_err();
        assert!(matches!(
            err,
            Error::NotConnected {
                state: ConnectionState::Connecting
            }
        ));
    }

    #[tokio::test]
    async fn test_send_while_open() {
        let host = TestHost::start().await;
        let client = ExtensionClient::connect(host.params(), options()).expect("connect");
        let mut ws = timeout(STEP, host.accepted).await.expect("accepted").expect("task");
        timeout(STEP, client.opened()).await.expect("opened").expect("open");

        let first = client.send("status", json!({ "ready": true })).expect("send");
        let second = client.send("status", json!({ "ready": false })).expect("send");
        assert_ne!(first, second);

        let frame = next_json(&mut ws).await;
        assert_eq!(frame["id"], first.to_string());
        assert_eq!(frame["accessToken"], "T");
        assert_eq!(frame["data"], json!({ "event": "status", "data": { "ready": true } }));

        let frame = next_json(&mut ws).await;
        assert_eq!(frame["id"], second.to_string());
    }

    #[tokio::test]
    async fn test_custom_reply_handler() {
        let host = TestHost::start().await;
        let options = options().reply_handler(|message| json!({ "echo": message.data }));
        let client = ExtensionClient::connect(host.params(), options).expect("connect");
        let mut ws = timeout(STEP, host.accepted).await.expect("accepted").expect("task");
        timeout(STEP, client.opened()).await.expect("opened").expect("open");

        send_text(&mut ws, r#"{"event":"eventToExtension","data":[1,2]}"#).await;
        let reply = next_json(&mut ws).await;
        assert_eq!(reply["data"]["data"], json!({ "echo": [1, 2] }));
    }

    #[tokio::test]
    async fn test_local_close() {
        let host = TestHost::start().await;
        let client = ExtensionClient::connect(host.params(), options()).expect("connect");
        let mut ws = timeout(STEP, host.accepted).await.expect("accepted").expect("task");
        timeout(STEP, client.opened()).await.expect("opened").expect("open");

        client.close();

        let frame = timeout(STEP, ws.next()).await.expect("frame in time");
        assert!(matches!(frame, Some(Ok(Message::Close(_)))));
        let state = timeout(STEP, client.closed()).await.expect("closed in time");
        assert_eq!(state, ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_host_close_completes_handshake() {
        let host = TestHost::start().await;
        let client = ExtensionClient::connect(host.params(), options()).expect("connect");
        let mut ws = timeout(STEP, host.accepted).await.expect("accepted").expect("task");
        timeout(STEP, client.opened()).await.expect("opened").expect("open");

        ws.send(Message::Close(None)).await.expect("host close");

        let frame = timeout(STEP, ws.next()).await.expect("close reply in time");
        assert!(matches!(frame, Some(Ok(Message::Close(_)))), "{frame:?}");
        let state = timeout(STEP, client.closed()).await.expect("closed in time");
        assert_eq!(state, ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_unreachable_host_fails_to_open() {
        let listener = TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0))
            .await
            .expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        drop(listener);
        let params = ConnectionParameters::new(port, "T", "C", "E1").expect("valid params");

        let client = ExtensionClient::connect(params, options()).expect("connect");
        let result = timeout(STEP, client.opened()).await.expect("settled in time");
        assert!(matches!(result, Err(Error::ConnectionClosed)));
        assert_eq!(client.state(), ConnectionState::Closed);
    }
}
