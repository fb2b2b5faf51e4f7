//! WebSocket transport layer.
//!
//! This module handles the single socket between the extension (Rust)
//! and the host application.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Extension      │                              │  Host           │
//! │  (this process) │         WebSocket            │  application    │
//! │  Connection     │─────────────────────────────►│                 │
//! │  → Lifecycle    │   localhost:nlPort?...       │  WebSocket      │
//! │                 │◄─────────────────────────────│  server         │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `Connection::open` - Spawn the connection task (state `Connecting`)
//! 2. Handshake succeeds - state `Open`, event loop starts
//! 3. Frames flow until the host closes or the transport fails
//! 4. State `Closed` - the process exits
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | WebSocket connection and event loop |
//! | `lifecycle` | Connection state machine |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and event loop.
pub mod connection;

/// Connection state machine.
pub mod lifecycle;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connection, FrameHandler};
pub use lifecycle::{ConnectionState, Lifecycle, LifecycleEvent};
