//! Control server router and handlers.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use tokio::sync::watch;
use tracing::{debug, info};

// ============================================================================
// Constants
// ============================================================================

/// Liveness check path.
pub const PING_ENDPOINT: &str = "/ping";

/// Remote shutdown path.
pub const SHUTDOWN_ENDPOINT: &str = "/shutdown";

// ============================================================================
// ControlState
// ============================================================================

/// Shared handler state.
#[derive(Clone)]
pub(crate) struct ControlState {
    /// Flipped to `true` once shutdown is requested.
    pub(crate) shutdown_tx: Arc<watch::Sender<bool>>,
}

// ============================================================================
// Router
// ============================================================================

/// Builds the control router.
///
/// Wrong methods on known paths get 404 like unknown paths do. `HEAD` is
/// routed explicitly since `get` would otherwise answer it.
pub(crate) fn build_control_router(state: ControlState) -> Router {
    Router::new()
        .route(
            PING_ENDPOINT,
            get(handle_ping)
                .head(handle_not_found)
                .fallback(handle_not_found),
        )
        .route(
            SHUTDOWN_ENDPOINT,
            post(handle_shutdown).fallback(handle_not_found),
        )
        .fallback(handle_not_found)
        .with_state(state)
}

async fn handle_ping() -> impl IntoResponse {
    (StatusCode::OK, "pong")
}

async fn handle_shutdown(State(state): State<ControlState>) -> impl IntoResponse {
    if !state.shutdown_tx.send_replace(true) {
        info!("Shutdown requested");
    }
    (StatusCode::OK, "Shutting down...")
}

async fn handle_not_found() -> impl IntoResponse {
    debug!("Unmatched control request");
    (StatusCode::NOT_FOUND, "Not found")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use tower::ServiceExt;

    fn app() -> (Router, watch::Receiver<bool>) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let state = ControlState {
            shutdown_tx: Arc::new(shutdown_tx),
        };
        (build_control_router(state), shutdown_rx)
    }

    async fn call(app: Router, method: &str, uri: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        (status, String::from_utf8(body.to_vec()).expect("utf-8 body"))
    }

    #[tokio::test]
    async fn test_ping() {
        let (app, shutdown_rx) = app();
        let request = Request::builder()
            .method("GET")
            .uri(PING_ENDPOINT)
            .body(Body::empty())
            .expect("request");

        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("text/plain"));

        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        assert_eq!(&body[..], b"pong");
        assert!(!*shutdown_rx.borrow());
    }

    #[tokio::test]
    async fn test_shutdown_flips_signal() {
        let (app, shutdown_rx) = app();
        let (status, body) = call(app, "POST", SHUTDOWN_ENDPOINT).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Shutting down...");
        assert!(*shutdown_rx.borrow());
    }

    #[tokio::test]
    async fn test_repeated_shutdown_is_idempotent() {
        let (app, shutdown_rx) = app();
        for _ in 0..2 {
            let (status, _) = call(app.clone(), "POST", SHUTDOWN_ENDPOINT).await;
            assert_eq!(status, StatusCode::OK);
        }
        assert!(*shutdown_rx.borrow());
    }

    #[tokio::test]
    async fn test_unmatched_requests_are_not_found() {
        let (app, shutdown_rx) = app();
        for (method, uri) in [
            ("POST", PING_ENDPOINT),
            ("HEAD", PING_ENDPOINT),
            ("GET", "/ping/"),
            ("GET", SHUTDOWN_ENDPOINT),
            ("DELETE", SHUTDOWN_ENDPOINT),
            ("GET", "/"),
            ("GET", "/status"),
        ] {
            let (status, body) = call(app.clone(), method, uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
            // HEAD responses carry no body
            if method != "HEAD" {
                assert_eq!(body, "Not found");
            }
        }
        assert!(!*shutdown_rx.borrow());
    }
}
