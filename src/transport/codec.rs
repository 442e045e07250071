//! Line framing and JSON encoding of commands and execution reports
//!
//! Each frame is one UTF-8 line. Inbound lines decode into a
//! [`MarketOrderCommand`]; every outbound line is one encoded
//! [`ExecutionOutcome`]. A line that cannot become a command is answered
//! with [`ExecutionOutcome::decode_failure`] and never reaches the engine.

use std::io;
use tokio_util::bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder, LinesCodec, LinesCodecError};
use tracing::warn;

use super::error::TransportResult;
use crate::domain::{ExecutionOutcome, MarketOrderCommand};
use crate::engine::MatchingEngine;

/// One inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A complete line, newline stripped
    Line(String),
    /// A line longer than the configured maximum; the rest of it is discarded
    Oversized,
    /// A line that is not valid UTF-8
    NotUtf8,
}

/// Newline framing that reports oversized and non-UTF-8 lines as frames
/// rather than stream errors, so the connection keeps its request/response
/// pairing. Only I/O failures surface as errors.
#[derive(Debug, Clone)]
pub struct LineFrameCodec {
    inner: LinesCodec,
}

impl LineFrameCodec {
    pub fn new(max_frame_length: usize) -> Self {
        Self {
            inner: LinesCodec::new_with_max_length(max_frame_length),
        }
    }

    fn classify(
        result: Result<Option<String>, LinesCodecError>,
    ) -> Result<Option<Frame>, LinesCodecError> {
        match result {
            Ok(line) => Ok(line.map(Frame::Line)),
            Err(LinesCodecError::MaxLineLengthExceeded) => Ok(Some(Frame::Oversized)),
            Err(LinesCodecError::Io(e)) if e.kind() == io::ErrorKind::InvalidData => {
                Ok(Some(Frame::NotUtf8))
            },
            Err(e) => Err(e),
        }
    }
}

impl Decoder for LineFrameCodec {
    type Item = Frame;
    type Error = LinesCodecError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Frame>, LinesCodecError> {
        Self::classify(self.inner.decode(buf))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Frame>, LinesCodecError> {
        Self::classify(self.inner.decode_eof(buf))
    }
}

impl<T: AsRef<str>> Encoder<T> for LineFrameCodec {
    type Error = LinesCodecError;

    fn encode(&mut self, line: T, buf: &mut BytesMut) -> Result<(), LinesCodecError> {
        self.inner.encode(line, buf)
    }
}

/// Strict parse of one frame into a command
pub fn decode_command(frame: &str) -> TransportResult<MarketOrderCommand> {
    Ok(serde_json::from_str(frame)?)
}

pub fn encode_command(command: &MarketOrderCommand) -> TransportResult<String> {
    Ok(serde_json::to_string(command)?)
}

/// Parse a report; rejects reports that break the FILLED/price presence rule
pub fn decode_outcome(frame: &str) -> TransportResult<ExecutionOutcome> {
    Ok(serde_json::from_str(frame)?)
}

pub fn encode_outcome(outcome: &ExecutionOutcome) -> TransportResult<String> {
    Ok(serde_json::to_string(outcome)?)
}

/// Turn one inbound frame into exactly one outcome.
pub fn resolve_frame(engine: &MatchingEngine, frame: &Frame) -> ExecutionOutcome {
    match frame {
        Frame::Line(line) => match decode_command(line) {
            Ok(command) => engine.process(&command),
            Err(e) => {
                warn!(error = %e, "rejecting malformed frame");
                ExecutionOutcome::decode_failure()
            },
        },
        Frame::Oversized => {
            warn!("rejecting oversized frame");
            ExecutionOutcome::decode_failure()
        },
        Frame::NotUtf8 => {
            warn!("rejecting frame that is not valid UTF-8");
            ExecutionOutcome::decode_failure()
        },
    }
}
