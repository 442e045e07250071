//! Transport configuration

use serde::{Deserialize, Serialize};

use super::error::{TransportError, TransportResult};

/// Default listening port
pub const DEFAULT_PORT: u16 = 8081;

/// Longest accepted frame, in bytes, excluding the newline
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 8192;

/// Server configuration
///
/// # Example
///
/// ```
/// use market_order_matcher::transport::ServerConfig;
///
/// // Loopback on an ephemeral port
/// let config = ServerConfig::local(0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    /// Host to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port to bind to; 0 picks an ephemeral port
    pub port: u16,
    /// Frames longer than this are answered with a REJECTED report
    pub max_frame_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
        }
    }
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Loopback-only configuration
    pub fn local(port: u16) -> Self {
        Self::new("127.0.0.1", port)
    }

    pub fn with_max_frame_length(mut self, max_frame_length: usize) -> Self {
        self.max_frame_length = max_frame_length;
        self
    }

    /// `host:port` as passed to the listener
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> TransportResult<()> {
        if self.host.trim().is_empty() {
            return Err(TransportError::ConfigError("host must not be empty".into()));
        }
        if self.max_frame_length == 0 {
            return Err(TransportError::ConfigError(
                "max frame length must be positive".into(),
            ));
        }
        Ok(())
    }
}
