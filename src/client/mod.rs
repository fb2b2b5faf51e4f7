//! Extension protocol client.
//!
//! Use [`ExtensionClient::connect`] to open the connection described by
//! the startup [`ConnectionParameters`](crate::ConnectionParameters).
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | [`ExtensionClient`] handle |
//! | `dispatch` | Inbound frame → reply mapping |
//! | `options` | [`ClientOptions`] builder |

// ============================================================================
// Submodules
// ============================================================================

/// Client handle.
pub mod core;

/// Inbound frame dispatch.
pub mod dispatch;

/// Client configuration.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use self::core::ExtensionClient;
pub use dispatch::Dispatcher;
pub use options::{ClientOptions, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REPLY, ReplyHandler};
