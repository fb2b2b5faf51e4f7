//! Connection bootstrap.
//!
//! Reads the startup payload the host writes to the extension's stdin
//! and turns it into an immutable [`ConnectionParameters`] value plus the
//! [`ConnectionTarget`] URL used to open the socket.
//!
//! # Startup Payload
//!
//! ```json
//! {
//!   "nlPort": 5000,
//!   "nlToken": "<access token>",
//!   "nlConnectToken": "<connect token>",
//!   "nlExtensionId": "js.neutralino.sampleextension"
//! }
//! ```
//!
//! The payload is read exactly once, before any socket activity. A missing
//! or incomplete payload is fatal: without all four values the extension
//! cannot authenticate.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `params` | Startup payload parsing and validation |
//! | `target` | WebSocket URL construction |

// ============================================================================
// Submodules
// ============================================================================

/// Startup payload parsing.
pub mod params;

/// Connection URL construction.
pub mod target;

// ============================================================================
// Re-exports
// ============================================================================

pub use params::ConnectionParameters;
pub use target::{ConnectionTarget, DEFAULT_HOST};
