//! Local control server.
//!
//! A tiny HTTP responder bound to the loopback interface, independent of
//! the extension client.
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | GET | `/ping` | 200 `pong` |
//! | POST | `/shutdown` | 200 `Shutting down...`, then graceful stop |
//! | * | * | 404 `Not found` |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `routes` | Router and handlers |
//! | `server` | Listener and graceful shutdown |

// ============================================================================
// Submodules
// ============================================================================

/// Router and handlers.
pub mod routes;

/// Listener and graceful shutdown.
pub mod server;

// ============================================================================
// Re-exports
// ============================================================================

pub use routes::{PING_ENDPOINT, SHUTDOWN_ENDPOINT};
pub use server::{ControlServer, DEFAULT_CONTROL_PORT};
