//! Connection lifecycle state machine.
//!
//! ```text
//!              Opened              Closed
//! Connecting ─────────► Open ─────────────────► Closed
//!      │                  │                       ▲
//!      │ Errored          │ Errored               │ Closed
//!      └──────────────► Errored ──────────────────┘
//! ```
//!
//! `Closed` is terminal. The process is expected to exit once it is
//! reached: there is no reconnect and nothing is buffered.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::logging::LogPolicy;

// ============================================================================
// ConnectionState
// ============================================================================

/// State of the single host connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Connection attempt in progress.
    Connecting,
    /// Socket established; sends are allowed.
    Open,
    /// Transport failure observed; a close follows.
    Errored,
    /// Socket gone. Terminal.
    Closed,
}

impl ConnectionState {
    /// Returns the state reached by applying `event`, or `None` if the
    /// event has no effect in this state.
    #[must_use]
    pub fn transition(self, event: &LifecycleEvent) -> Option<Self> {
        match (self, event) {
            (Self::Connecting, LifecycleEvent::Opened) => Some(Self::Open),
            (Self::Connecting | Self::Open, LifecycleEvent::Errored { .. }) => Some(Self::Errored),
            (Self::Open | Self::Errored, LifecycleEvent::Closed) => Some(Self::Closed),
            _ => None,
        }
    }

    /// Returns `true` for the terminal state.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Errored => "errored",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

// ============================================================================
// LifecycleEvent
// ============================================================================

/// Connection-level event driving [`ConnectionState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Socket established.
    Opened,
    /// Transport-level failure.
    Errored {
        /// Description of the failure.
        message: String,
    },
    /// Socket closed for any reason.
    Closed,
}

impl LifecycleEvent {
    /// Creates an error event.
    #[inline]
    pub fn errored(message: impl Into<String>) -> Self {
        Self::Errored {
            message: message.into(),
        }
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Owner of the connection state.
///
/// Applies [`LifecycleEvent`]s, logs each transition according to the
/// [`LogPolicy`], and publishes the state to any number of watchers.
#[derive(Debug)]
pub struct Lifecycle {
    /// Publishes the current state.
    state_tx: watch::Sender<ConnectionState>,
    /// Verbosity for transition logs.
    policy: LogPolicy,
}

impl Lifecycle {
    /// Creates a lifecycle in the `Connecting` state.
    #[must_use]
    pub fn new(policy: LogPolicy) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Connecting);
        Self { state_tx, policy }
    }

    /// Returns the current state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Returns a receiver observing every state change.
    #[inline]
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Applies an event.
    ///
    /// Returns the new state, or `None` if the event was ignored.
    pub fn fire(&self, event: LifecycleEvent) -> Option<ConnectionState> {
        let mut next = None;
        self.state_tx.send_if_modified(|state| match state.transition(&event) {
            Some(new_state) => {
                *state = new_state;
                next = Some(new_state);
                true
            }
            None => false,
        });

        let Some(state) = next else {
            debug!(state = %self.state(), ?event, "Ignoring lifecycle event");
            return None;
        };

        match &event {
            LifecycleEvent::Opened if self.policy.announces() => info!("Connected"),
            LifecycleEvent::Opened => debug!("Connected"),
            LifecycleEvent::Errored { message } => error!(error = %message, "Connection error!"),
            LifecycleEvent::Closed if self.policy.echoes_traffic() => info!("Connection closed"),
            LifecycleEvent::Closed => debug!("Connection closed"),
        }

        Some(state)
    }
}

// ============================================================================
// Tests
// ============================================================================
