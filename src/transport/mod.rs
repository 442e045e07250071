// ============================================================================
// Transport Module
// Newline-delimited JSON over TCP in front of the matching engine
// ============================================================================

pub mod codec;
pub mod config;
pub mod error;

mod client;
mod server;

pub use client::MatchingClient;
pub use codec::{
    decode_command, decode_outcome, encode_command, encode_outcome, resolve_frame, Frame,
    LineFrameCodec,
};
pub use config::ServerConfig;
pub use error::{TransportError, TransportResult};
pub use server::{ConnectionId, MatchingServer};
