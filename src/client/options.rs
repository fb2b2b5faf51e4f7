//! Client configuration.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use nl_extension::{ClientOptions, LogPolicy};
//! use serde_json::json;
//!
//! let options = ClientOptions::new()
//!     .log_policy(LogPolicy::Verbose)
//!     .connect_timeout(Some(Duration::from_secs(5)))
//!     .reply_handler(|message| json!({ "echo": message.data }));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::bootstrap::DEFAULT_HOST;
use crate::logging::LogPolicy;
use crate::protocol::InboundMessage;

// ============================================================================
// Constants
// ============================================================================

/// Payload of the default `eventFromExtension` reply.
pub const DEFAULT_REPLY: &str = "Hello app!";

/// Default limit for the WebSocket handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Types
// ============================================================================

/// Produces the payload of the reply to an `eventToExtension` message.
pub type ReplyHandler = Arc<dyn Fn(&InboundMessage) -> Value + Send + Sync>;

// ============================================================================
// ClientOptions
// ============================================================================

/// Options for [`ExtensionClient::connect`](super::ExtensionClient::connect).
#[derive(Clone)]
pub struct ClientOptions {
    /// Host name of the application.
    host: String,
    /// Traffic logging verbosity.
    log_policy: LogPolicy,
    /// Handshake limit (`None` waits forever).
    connect_timeout: Option<Duration>,
    /// Reply payload producer.
    reply_handler: ReplyHandler,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            log_policy: LogPolicy::default(),
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            reply_handler: Arc::new(default_reply),
        }
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("host", &self.host)
            .field("log_policy", &self.log_policy)
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl ClientOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the host name (default `localhost`).
    #[inline]
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the logging policy.
    #[inline]
    #[must_use]
    pub fn log_policy(mut self, policy: LogPolicy) -> Self {
        self.log_policy = policy;
        self
    }

    /// Sets the handshake timeout. `None` disables it.
    #[inline]
    #[must_use]
    pub fn connect_timeout(mut self, limit: Option<Duration>) -> Self {
        self.connect_timeout = limit;
        self
    }

    /// Replaces the reply payload producer.
    #[inline]
    #[must_use]
    pub fn reply_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&InboundMessage) -> Value + Send + Sync + 'static,
    {
        self.reply_handler = Arc::new(handler);
        self
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl ClientOptions {
    /// Returns the host name.
    #[inline]
    #[must_use]
    pub fn host_name(&self) -> &str {
        &self.host
    }

    /// Returns the logging policy.
    #[inline]
    #[must_use]
    pub const fn policy(&self) -> LogPolicy {
        self.log_policy
    }

    /// Returns the handshake timeout.
    #[inline]
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    /// Returns the reply payload producer.
    #[inline]
    #[must_use]
    pub fn replies(&self) -> ReplyHandler {
        Arc::clone(&self.reply_handler)
    }
}

/// Default reply: a fixed greeting.
fn default_reply(_message: &InboundMessage) -> Value {
    Value::String(DEFAULT_REPLY.to_string())
}

// ============================================================================
// Tests
// ============================================================================
