//! WebSocket protocol message types.
//!
//! This module defines the JSON frames exchanged between the extension
//! and the host.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `InboundMessage` | Host → Extension | Event notification `{event, data}` |
//! | `OutboundMessage` | Extension → Host | Authenticated broadcast request |
//!
//! Every outbound frame carries a fresh UUID, the `app.broadcast` method
//! and the access token issued at startup.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `event` | Well-known event names and classification |
//! | `message` | Inbound and outbound frame types |

// ============================================================================
// Submodules
// ============================================================================

/// Event names and classification.
pub mod event;

/// Inbound and outbound message types.
pub mod message;

// ============================================================================
// Re-exports
// ============================================================================

pub use event::{APP_BROADCAST, EVENT_FROM_EXTENSION, EVENT_TO_EXTENSION, EventKind};
pub use message::{BROADCAST_METHOD, EventPayload, InboundMessage, OutboundMessage};
