//! Inbound frame dispatch.
//!
//! Maps each text frame to at most one outbound reply. Pure apart from
//! logging, so every rule can be tested without a socket.
//!
//! | Frame | Outcome |
//! |-------|---------|
//! | not JSON / no `event` | dropped, logged as a protocol anomaly |
//! | `eventToExtension` | exactly one `eventFromExtension` reply |
//! | `app.broadcast` | logged only |
//! | other events | ignored |

// ============================================================================
// Imports
// ============================================================================

use tracing::{debug, info, warn};

use crate::logging::LogPolicy;
use crate::protocol::{EVENT_FROM_EXTENSION, EventKind, InboundMessage, OutboundMessage};
use crate::transport::FrameHandler;

use super::options::ReplyHandler;

// ============================================================================
// Dispatcher
// ============================================================================

/// Turns inbound frames into replies.
pub struct Dispatcher {
    /// Token stamped on every reply.
    access_token: String,
    /// Reply payload producer.
    reply: ReplyHandler,
    /// Traffic logging verbosity.
    policy: LogPolicy,
}

impl Dispatcher {
    /// Creates a dispatcher.
    #[must_use]
    pub fn new(access_token: impl Into<String>, reply: ReplyHandler, policy: LogPolicy) -> Self {
        Self {
            access_token: access_token.into(),
            reply,
            policy,
        }
    }

    /// Handles one text frame.
    ///
    /// Returns the reply to send, if any. Never fails: undecodable
    /// frames are logged and dropped.
    pub fn dispatch(&self, text: &str) -> Option<OutboundMessage> {
        let message = match InboundMessage::parse(text) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, len = text.len(), "Dropping invalid message");
                return None;
            }
        };

        if self.policy.echoes_traffic() {
            info!(event = %message.event, data = %message.data, "Received event");
        }

        let kind = message.kind();
        match kind {
            EventKind::ToExtension if self.policy.announces() => {
                info!(data = %message.data, "Received eventToExtension");
            }
            EventKind::ToExtension => {
                debug!(data = %message.data, "Received eventToExtension");
            }
            EventKind::Broadcast if self.policy.echoes_traffic() => {
                info!(data = %message.data, "Received broadcast event from app");
            }
            EventKind::Broadcast => {
                debug!(data = %message.data, "Received broadcast event from app");
            }
            EventKind::Other => {
                debug!(event = %message.event, "Ignoring unhandled event");
            }
        }

        if !kind.expects_reply() {
            return None;
        }

        let payload = (self.reply)(&message);
        let reply = OutboundMessage::broadcast(&*self.access_token, EVENT_FROM_EXTENSION, payload);
        debug!(request_id = %reply.id, "Replying with eventFromExtension");
        Some(reply)
    }

    /// Wraps the dispatcher as a connection frame handler.
    #[must_use]
    pub fn into_frame_handler(self) -> FrameHandler {
        Box::new(move |text| self.dispatch(text))
    }
}

// ============================================================================
// Tests
// ============================================================================
