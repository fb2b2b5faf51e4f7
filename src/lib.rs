//! Neutralino-style extension client.
//!
//! This library implements the out-of-process side of the extension
//! protocol: the extension reads its connection parameters from stdin,
//! opens a WebSocket to the host, answers events, and exits when the
//! host disconnects.
//!
//! # Architecture
//!
//! The extension is a client of the host:
//!
//! - **Host (application)**: Listens on `localhost:nlPort`, pushes events
//! - **Extension (Rust)**: Connects with the connect token, replies with
//!   `app.broadcast` messages signed by the access token
//!
//! Key design principles:
//!
//! - Parameters are read once into an immutable value, no globals
//! - One socket, owned by one event loop task
//! - Connection state is an explicit state machine
//! - Closing the socket ends the process (no reconnect)
//!
//! # Quick Start
//!
//! ```no_run
//! use nl_extension::{ClientOptions, ConnectionParameters, ExtensionClient, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let params = ConnectionParameters::from_stdin()?;
//!     let client = ExtensionClient::connect(params, ClientOptions::new())?;
//!
//!     client.closed().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`bootstrap`] | Startup payload and connection URL |
//! | [`client`] | [`ExtensionClient`] and dispatch |
//! | [`control`] | Loopback ping/shutdown server |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`logging`] | Subscriber setup and [`LogPolicy`] |
//! | [`protocol`] | WebSocket message types |
//! | [`transport`] | WebSocket connection and lifecycle |

// ============================================================================
// Modules
// ============================================================================

/// Startup payload parsing and connection URL construction.
pub mod bootstrap;

/// Extension protocol client.
///
/// Use [`ExtensionClient::connect()`] to start the connection.
pub mod client;

/// Loopback control server.
pub mod control;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Logging setup.
pub mod logging;

/// WebSocket protocol message types.
pub mod protocol;

/// WebSocket transport layer.
///
/// Internal module handling the host connection and its state machine.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Bootstrap types
pub use bootstrap::{ConnectionParameters, ConnectionTarget, DEFAULT_HOST};

// Client types
pub use client::{ClientOptions, DEFAULT_REPLY, Dispatcher, ExtensionClient, ReplyHandler};

// Control server types
pub use control::{ControlServer, DEFAULT_CONTROL_PORT};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ExtensionId, RequestId};

// Logging
pub use logging::LogPolicy;

// Protocol types
pub use protocol::{InboundMessage, OutboundMessage};

// Transport types
pub use transport::ConnectionState;
