//! Logging setup and verbosity policy.
//!
//! The library only emits `tracing` events. Binaries call
//! [`init_logging`] once to install a `tracing-subscriber` formatter.
//!
//! [`LogPolicy`] controls how chatty the client is about protocol
//! traffic, independent of the subscriber's level filter.

// ============================================================================
// Imports
// ============================================================================

use std::io;

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

// ============================================================================
// LogPolicy
// ============================================================================

/// How much protocol traffic the client reports at `info` level.
///
/// | Policy | Connection success | `eventToExtension` data | Every event, broadcasts, closure |
/// |--------|--------------------|-------------------------|----------------------------------|
/// | `Quiet` | debug | debug | debug |
/// | `Standard` | info | info | debug |
/// | `Verbose` | info | info | info |
///
/// Errors and protocol anomalies are reported under every policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogPolicy {
    /// Warnings and errors only.
    Quiet,
    /// Connection success and replies.
    #[default]
    Standard,
    /// Everything the host sends.
    Verbose,
}

impl LogPolicy {
    /// Returns `true` if connection success and handled events go to `info`.
    #[inline]
    #[must_use]
    pub const fn announces(self) -> bool {
        !matches!(self, Self::Quiet)
    }

    /// Returns `true` if all inbound traffic and closure go to `info`.
    #[inline]
    #[must_use]
    pub const fn echoes_traffic(self) -> bool {
        matches!(self, Self::Verbose)
    }
}

// ============================================================================
// Subscriber Setup
// ============================================================================

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `nl_extension=info` is used,
/// or `nl_extension=debug` when `debug` is set. Output goes to stderr.
/// Calling this twice is harmless.
pub fn init_logging(debug: bool) {
    let fallback = if debug {
        "nl_extension=debug"
    } else {
        "nl_extension=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

// ============================================================================
// Tests
// ============================================================================
