//! Startup payload parsing and validation.
//!
//! # Example
//!
//! ```ignore
//! use nl_extension::ConnectionParameters;
//!
//! let params = ConnectionParameters::from_stdin()?;
//! let target = params.target("localhost")?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::io::{self, Read};
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Deserializer;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::identifiers::ExtensionId;

use super::target::ConnectionTarget;

// ============================================================================
// StartupPayload
// ============================================================================

/// Wire shape of the startup payload.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartupPayload {
    nl_port: u16,
    nl_token: String,
    nl_connect_token: String,
    nl_extension_id: String,
}

// ============================================================================
// ConnectionParameters
// ============================================================================

/// Parameters the host hands to the extension at startup.
///
/// Immutable for the lifetime of the process. The access token
/// authorizes outbound messages; the connect token authenticates the
/// socket handshake. Neither is ever rendered by [`fmt::Debug`].
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParameters {
    /// Port the host listens on.
    host_port: u16,
    /// Token copied into every outbound message.
    access_token: String,
    /// Token sent in the socket query string.
    connect_token: String,
    /// Identity of this extension.
    extension_id: ExtensionId,
}

impl ConnectionParameters {
    /// Creates parameters from individual values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Startup`] if any string value is empty or the port is 0.
    pub fn new(
        host_port: u16,
        access_token: impl Into<String>,
        connect_token: impl Into<String>,
        extension_id: impl Into<String>,
    ) -> Result<Self> {
        let access_token = access_token.into();
        let connect_token = connect_token.into();
        let extension_id = extension_id.into();

        if host_port == 0 {
            return Err(Error::startup("nlPort must be a non-zero port"));
        }
        for (name, value) in [
            ("nlToken", &access_token),
            ("nlConnectToken", &connect_token),
            ("nlExtensionId", &extension_id),
        ] {
            if value.is_empty() {
                return Err(Error::startup(format!("{name} must not be empty")));
            }
        }

        Ok(Self {
            host_port,
            access_token,
            connect_token,
            extension_id: ExtensionId::new(extension_id),
        })
    }

    /// Reads the startup payload from a reader.
    ///
    /// Only the first JSON value is consumed, so a host that keeps the
    /// pipe open after writing the payload does not block startup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Startup`] if the input is empty, not JSON, or
    /// missing any of the four required fields.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let payload = Deserializer::from_reader(reader)
            .into_iter::<StartupPayload>()
            .next()
            .ok_or_else(|| Error::startup("startup payload is empty"))?
            .map_err(|e| Error::startup(format!("invalid startup payload: {e}")))?;

        Self::new(
            payload.nl_port,
            payload.nl_token,
            payload.nl_connect_token,
            payload.nl_extension_id,
        )
    }

    /// Reads the startup payload from the process's stdin.
    ///
    /// # Errors
    ///
    /// See [`ConnectionParameters::from_reader`].
    pub fn from_stdin() -> Result<Self> {
        Self::from_reader(io::stdin().lock())
    }

    /// Returns the host port.
    #[inline]
    #[must_use]
    pub const fn host_port(&self) -> u16 {
        self.host_port
    }

    /// Returns the access token used to authorize outbound messages.
    #[inline]
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Returns the connect token used during the socket handshake.
    #[inline]
    #[must_use]
    pub fn connect_token(&self) -> &str {
        &self.connect_token
    }

    /// Returns the extension id.
    #[inline]
    #[must_use]
    pub fn extension_id(&self) -> &ExtensionId {
        &self.extension_id
    }

    /// Builds the socket target for the given host name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the resulting URL is invalid.
    pub fn target(&self, host: &str) -> Result<ConnectionTarget> {
        ConnectionTarget::new(host, self.host_port, &self.extension_id, &self.connect_token)
    }

    /// Emits one diagnostic line per parameter.
    ///
    /// Tokens are redacted to their length.
    pub fn log_diagnostics(&self) {
        info!(extension_id = %self.extension_id, nl_port = self.host_port, "NL_PORT");
        debug!(extension_id = %self.extension_id, nl_token = %redact(&self.access_token), "NL_TOKEN");
        debug!(extension_id = %self.extension_id, nl_connect_token = %redact(&self.connect_token), "NL_CTOKEN");
        info!(extension_id = %self.extension_id, "NL_EXTID");
    }
}

impl FromStr for ConnectionParameters {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_reader(s.as_bytes())
    }
}

impl fmt::Debug for ConnectionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParameters")
            .field("host_port", &self.host_port)
            .field("access_token", &redact(&self.access_token))
            .field("connect_token", &redact(&self.connect_token))
            .field("extension_id", &self.extension_id)
            .finish()
    }
}

/// Renders a secret as its length only.
fn redact(secret: &str) -> String {
    format!("<redacted {} chars>", secret.chars().count())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "nlPort": 5000,
        "nlToken": "T",
        "nlConnectToken": "C",
        "nlExtensionId": "E1"
    }"#;

    #[test]
    fn test_parse_complete_payload() {
        let params: ConnectionParameters = SAMPLE.parse().expect("parse");
        assert_eq!(params.host_port(), 5000);
        assert_eq!(params.access_token(), "T");
        assert_eq!(params.connect_token(), "C");
        assert_eq!(params.extension_id().as_str(), "E1");
    }

    #[test]
    fn test_reader_stops_after_first_value() {
        let input = format!("{SAMPLE}\n{{\"trailing\": true}}");
        let params = ConnectionParameters::from_reader(input.as_bytes()).expect("parse");
        assert_eq!(params.host_port(), 5000);
    }

    #[test]
    fn test_empty_payload_is_fatal() {
        let err = ConnectionParameters::from_reader("   \n".as_bytes()).unwrap_err();
        assert!(err.is_startup_error());
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_malformed_payload_is_fatal() {
        let err = "nlPort=5000".parse::<ConnectionParameters>().unwrap_err();
        assert!(matches!(err, Error::Startup { .. }));
    }

    #[test]
    fn test_missing_field_is_fatal() {
        let err = r#"{"nlPort": 5000, "nlToken": "T", "nlExtensionId": "E1"}"#
            .parse::<ConnectionParameters>()
            .unwrap_err();
        assert!(err.to_string().contains("nlConnectToken"));
    }

    #[test]
    fn test_out_of_range_port_is_fatal() {
        let err = r#"{"nlPort": 70000, "nlToken": "T", "nlConnectToken": "C", "nlExtensionId": "E1"}"#
            .parse::<ConnectionParameters>()
            .unwrap_err();
        assert!(err.is_startup_error());
    }

    #[test]
    fn test_empty_values_are_rejected() {
        assert!(ConnectionParameters::new(5000, "", "C", "E1").is_err());
        assert!(ConnectionParameters::new(5000, "T", "", "E1").is_err());
        assert!(ConnectionParameters::new(5000, "T", "C", "").is_err());
        assert!(ConnectionParameters::new(0, "T", "C", "E1").is_err());
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let params =
            ConnectionParameters::new(5000, "super-secret", "connect-secret", "E1").expect("valid");
        let rendered = format!("{params:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("connect-secret"));
        assert!(rendered.contains("<redacted 12 chars>"));
        assert!(rendered.contains("E1"));
    }

    #[test]
    fn test_scenario_target() {
        let params: ConnectionParameters = SAMPLE.parse().expect("parse");
        let target = params.target("localhost").expect("target");
        assert_eq!(
            target.as_str(),
            "ws://localhost:5000?extensionId=E1&connectToken=C"
        );
    }
}
