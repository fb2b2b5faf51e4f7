//! Control server listener.
//!
//! # Example
//!
//! ```no_run
//! use nl_extension::{ControlServer, DEFAULT_CONTROL_PORT};
//!
//! # async fn example() -> nl_extension::Result<()> {
//! let server = ControlServer::bind(DEFAULT_CONTROL_PORT).await?;
//! // Returns after POST /shutdown
//! server.serve().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use crate::error::Result;

use super::routes::{ControlState, build_control_router};

// ============================================================================
// Constants
// ============================================================================

/// Port the control server listens on by default.
pub const DEFAULT_CONTROL_PORT: u16 = 8181;

/// Control server only listens on loopback.
const CONTROL_BIND_IP: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

// ============================================================================
// ControlServer
// ============================================================================

/// A bound control server that has not started serving yet.
pub struct ControlServer {
    /// TCP listener for incoming requests.
    listener: TcpListener,
    /// Address the listener is bound to.
    local_addr: SocketAddr,
    /// Shutdown signal shared with the handlers.
    shutdown_tx: Arc<watch::Sender<bool>>,
}

impl ControlServer {
    /// Binds to `127.0.0.1:{port}`.
    ///
    /// Use port 0 to let the OS assign a random available port.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if binding fails.
    pub async fn bind(port: u16) -> Result<Self> {
        let listener = TcpListener::bind(SocketAddr::new(CONTROL_BIND_IP, port)).await?;
        let local_addr = listener.local_addr()?;
        let (shutdown_tx, _) = watch::channel(false);

        Ok(Self {
            listener,
            local_addr,
            shutdown_tx: Arc::new(shutdown_tx),
        })
    }

    /// Returns the bound address.
    #[inline]
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serves requests until `POST /shutdown`.
    ///
    /// After the shutdown request the listener stops accepting, in-flight
    /// responses complete, and this returns `Ok(())`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the server fails.
    pub async fn serve(self) -> Result<()> {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let app = build_control_router(ControlState {
            shutdown_tx: Arc::clone(&self.shutdown_tx),
        });

        info!("Server running at http://{}/", self.local_addr);

        axum::serve(self.listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.wait_for(|requested| *requested).await;
            })
            .await?;

        info!("Server shut down.");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
