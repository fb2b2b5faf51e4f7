//! Inbound and outbound message types.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Value, from_str};

use crate::error::{Error, Result};
use crate::identifiers::RequestId;

use super::EventKind;

// ============================================================================
// Constants
// ============================================================================

/// Host method every outbound message invokes.
pub const BROADCAST_METHOD: &str = "app.broadcast";

// ============================================================================
// InboundMessage
// ============================================================================

/// An event notification from the host.
///
/// # Format
///
/// ```json
/// { "event": "eventToExtension", "data": "hi" }
/// ```
///
/// `data` defaults to `null` when absent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InboundMessage {
    /// Event name.
    pub event: String,

    /// Event-specific data.
    #[serde(default)]
    pub data: Value,
}

impl InboundMessage {
    /// Parses one text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the frame is not JSON or has no
    /// string `event` field.
    pub fn parse(text: &str) -> Result<Self> {
        from_str(text).map_err(|e| Error::protocol(format!("undecodable inbound frame: {e}")))
    }

    /// Classifies the event name.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> EventKind {
        EventKind::from_name(&self.event)
    }
}

// ============================================================================
// EventPayload
// ============================================================================

/// Nested `{event, data}` body of an outbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    /// Event name delivered to the host's listeners.
    pub event: String,

    /// Event data.
    pub data: Value,
}

// ============================================================================
// OutboundMessage
// ============================================================================

/// An authenticated broadcast request from the extension to the host.
///
/// # Format
///
/// ```json
/// {
///   "id": "uuid",
///   "method": "app.broadcast",
///   "accessToken": "token",
///   "data": { "event": "eventFromExtension", "data": "Hello app!" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    /// Fresh identifier, unique per send.
    pub id: RequestId,

    /// Host method, always [`BROADCAST_METHOD`].
    pub method: String,

    /// Access token issued at startup.
    pub access_token: String,

    /// Event body.
    pub data: EventPayload,
}

impl OutboundMessage {
    /// Creates a broadcast message with an auto-generated id.
    #[inline]
    #[must_use]
    pub fn broadcast(access_token: impl Into<String>, event: impl Into<String>, data: Value) -> Self {
        Self {
            id: RequestId::generate(),
            method: BROADCAST_METHOD.to_string(),
            access_token: access_token.into(),
            data: EventPayload {
                event: event.into(),
                data,
            },
        }
    }

    /// Serializes to the text of a single frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn to_frame(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ============================================================================
// Tests
// ============================================================================
