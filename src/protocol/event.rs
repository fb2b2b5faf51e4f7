//! Event names and classification.
//!
//! # Event Types
//!
//! | Name | Direction | Handling |
//! |------|-----------|----------|
//! | `eventToExtension` | Host → Extension | Logged, answered with one reply |
//! | `app.broadcast` | Host → Extension | Logged only |
//! | `eventFromExtension` | Extension → Host | Event name of the reply |

// ============================================================================
// Constants
// ============================================================================

/// Event the host sends when it expects a reply.
pub const EVENT_TO_EXTENSION: &str = "eventToExtension";

/// Event carried by the extension's reply.
pub const EVENT_FROM_EXTENSION: &str = "eventFromExtension";

/// Broadcast event echoed by the host.
pub const APP_BROADCAST: &str = "app.broadcast";

// ============================================================================
// EventKind
// ============================================================================

/// Classification of an inbound event name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// `eventToExtension`: requires exactly one reply.
    ToExtension,
    /// `app.broadcast`: observability only.
    Broadcast,
    /// Anything else: logged and ignored.
    Other,
}

impl EventKind {
    /// Classifies an event name.
    #[inline]
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            EVENT_TO_EXTENSION => Self::ToExtension,
            APP_BROADCAST => Self::Broadcast,
            _ => Self::Other,
        }
    }

    /// Returns `true` if events of this kind are answered.
    #[inline]
    #[must_use]
    pub const fn expects_reply(self) -> bool {
        matches!(self, Self::ToExtension)
    }
}

// ============================================================================
// Tests
// ============================================================================
