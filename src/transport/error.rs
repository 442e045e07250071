//! Transport error types

use std::io;
use thiserror::Error;
use tokio_util::codec::LinesCodecError;

/// Result type alias for transport operations
pub type TransportResult<T> = std::result::Result<T, TransportError>;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to bind to address {address}: {source}")]
    BindError {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid transport configuration: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Framing error: {0}")]
    Frame(#[from] LinesCodecError),

    /// A frame that is not a well-formed command or report
    #[error("Malformed frame: {0}")]
    Decode(#[from] serde_json::Error),

    /// A response frame that is oversized or not valid UTF-8
    #[error("Unexpected frame from peer: {0}")]
    UnexpectedFrame(String),

    #[error("Connection closed by peer")]
    ConnectionClosed,
}

impl TransportError {
    /// Create a bind error from an address string and IO error
    pub fn bind(address: impl Into<String>, source: io::Error) -> Self {
        Self::BindError {
            address: address.into(),
            source,
        }
    }
}
