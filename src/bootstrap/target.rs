//! WebSocket URL construction.
//!
//! Format: `ws://{host}:{port}?extensionId={id}&connectToken={token}`
//!
//! The access token is deliberately absent: it only authorizes messages
//! once the socket is open.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use url::Url;

use crate::error::{Error, Result};
use crate::identifiers::ExtensionId;

// ============================================================================
// Constants
// ============================================================================

/// Host name the extension connects to unless overridden.
pub const DEFAULT_HOST: &str = "localhost";

// ============================================================================
// ConnectionTarget
// ============================================================================

/// Validated WebSocket URL of the host.
///
/// [`as_str`](Self::as_str) keeps the textual form built from the
/// parameters; [`request_url`](Self::request_url) is the normalized URL
/// handed to the WebSocket handshake (root path made explicit).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    /// Target as built from the parameters.
    url: String,
    /// Normalized form.
    parsed: Url,
}

impl ConnectionTarget {
    /// Builds the target URL.
    ///
    /// Query values are percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the host is empty or the URL does not parse.
    pub fn new(
        host: &str,
        port: u16,
        extension_id: &ExtensionId,
        connect_token: &str,
    ) -> Result<Self> {
        if host.trim().is_empty() {
            return Err(Error::config("host must not be empty"));
        }

        let url = format!(
            "ws://{host}:{port}?extensionId={}&connectToken={}",
            urlencoding::encode(extension_id.as_str()),
            urlencoding::encode(connect_token),
        );

        let parsed = Url::parse(&url)
            .map_err(|e| Error::config(format!("invalid connection target {host}:{port}: {e}")))?;
        if parsed.host_str().is_none() {
            return Err(Error::config(format!("connection target has no host: {host}")));
        }

        Ok(Self { url, parsed })
    }

    /// Returns the URL as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Returns the normalized URL used for the handshake.
    #[inline]
    #[must_use]
    pub fn request_url(&self) -> &str {
        self.parsed.as_str()
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn test_target_format() {
        let target = ConnectionTarget::new(
            DEFAULT_HOST,
            5000,
            &ExtensionId::new("js.neutralino.sampleextension"),
            "abc123",
        )
        .expect("valid target");

        assert_eq!(
            target.to_string(),
            "ws://localhost:5000?extensionId=js.neutralino.sampleextension&connectToken=abc123"
        );
    }

    #[test]
    fn test_query_values_are_encoded() {
        let target = ConnectionTarget::new("127.0.0.1", 5000, &ExtensionId::new("a b"), "x&y=z")
            .expect("valid target");

        assert_eq!(
            target.as_str(),
            "ws://127.0.0.1:5000?extensionId=a%20b&connectToken=x%26y%3Dz"
        );
    }

    #[test]
    fn test_request_url_has_root_path() {
        let target = ConnectionTarget::new(DEFAULT_HOST, 5000, &ExtensionId::new("E1"), "C")
            .expect("valid target");

        assert_eq!(
            target.request_url(),
            "ws://localhost:5000/?extensionId=E1&connectToken=C"
        );
    }

    #[test]
    fn test_empty_host_rejected() {
        let err = ConnectionTarget::new("  ", 5000, &ExtensionId::new("E1"), "C").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_invalid_host_rejected() {
        let err =
            ConnectionTarget::new("bad host", 5000, &ExtensionId::new("E1"), "C").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    proptest! {
        #[test]
        fn prop_target_carries_connect_credentials_only(
            port in 1u16..=u16::MAX,
            extension_id in "[A-Za-z0-9.]{1,24}",
            connect_token in "[A-Za-z0-9]{1,32}",
            access_token in "secret-[a-z]{12}",
        ) {
            let params = crate::bootstrap::ConnectionParameters::new(
                port,
                access_token.clone(),
                connect_token.clone(),
                extension_id.clone(),
            )
            .expect("valid params");
            let target = params.target(DEFAULT_HOST).expect("valid target");

            prop_assert_eq!(
                target.as_str(),
                format!("ws://localhost:{port}?extensionId={extension_id}&connectToken={connect_token}")
            );
            prop_assert!(!target.as_str().contains(&access_token));
        }
    }
}
