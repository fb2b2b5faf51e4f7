//! Error types for the extension client and control server.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use nl_extension::{ConnectionParameters, Result};
//!
//! fn example(raw: &str) -> Result<()> {
//!     let params: ConnectionParameters = raw.parse()?;
//!     params.log_diagnostics();
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants | Handling |
//! |----------|----------|----------|
//! | Startup | [`Error::Startup`] | Fatal, bad payload exit code |
//! | Configuration | [`Error::Config`] | Fatal, process does not start |
//! | Connection | [`Error::Connection`], [`Error::ConnectionTimeout`], [`Error::ConnectionClosed`], [`Error::NotConnected`] | Logged, drives the lifecycle |
//! | Protocol | [`Error::Protocol`] | Frame dropped, processing continues |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`] | Wrapped |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::transport::ConnectionState;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Startup Errors
    // ========================================================================
    /// Startup payload is absent, malformed or incomplete.
    ///
    /// The extension cannot authenticate without all four parameters,
    /// so this is always fatal.
    #[error("Startup error: {message}")]
    Startup {
        /// Description of what is wrong with the payload.
        message: String,
    },

    /// Configuration error.
    ///
    /// Returned when client or server options are invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket connection failed.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Host did not accept the connection in time.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// WebSocket connection closed.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Send attempted while the connection is not open.
    #[error("Not connected (state: {state})")]
    NotConnected {
        /// State observed at the time of the send.
        state: ConnectionState,
    },

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Inbound frame could not be decoded.
    ///
    /// Never fatal: the frame is dropped and the loop continues.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a startup error.
    #[inline]
    pub fn startup(message: impl Into<String>) -> Self {
        Self::Startup {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates a not connected error.
    #[inline]
    pub fn not_connected(state: ConnectionState) -> Self {
        Self::NotConnected { state }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if the startup payload was unusable.
    #[inline]
    #[must_use]
    pub fn is_startup_error(&self) -> bool {
        matches!(self, Self::Startup { .. })
    }

    /// Returns `true` if processing may continue after this error.
    ///
    /// Only encode and decode anomalies qualify: a lost connection ends
    /// the process.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Protocol { .. } | Self::Json(_))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::connection("refused");
        assert_eq!(err.to_string(), "Connection failed: refused");
    }

    #[test]
    fn test_startup_error() {
        let err = Error::startup("missing field `nlPort`");
        assert_eq!(err.to_string(), "Startup error: missing field `nlPort`");
        assert!(err.is_startup_error());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_not_connected_display() {
        let err = Error::not_connected(ConnectionState::Connecting);
        assert_eq!(err.to_string(), "Not connected (state: connecting)");
    }

    #[test]
    fn test_config_is_not_a_startup_error() {
        assert!(!Error::config("bad host").is_startup_error());
        assert!(!Error::connection_timeout(1000).is_startup_error());
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::protocol("missing event").is_recoverable());
        assert!(!Error::ConnectionClosed.is_recoverable());
        assert!(!Error::startup("x").is_recoverable());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::UnexpectedEof, "stdin closed");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.is_recoverable());
    }
}
