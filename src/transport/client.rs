//! Line-oriented client for the matching server

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio_util::codec::Framed;

use super::codec::{decode_outcome, encode_command, Frame, LineFrameCodec};
use super::config::DEFAULT_MAX_FRAME_LENGTH;
use super::error::{TransportError, TransportResult};
use crate::domain::{ExecutionOutcome, MarketOrderCommand};

/// One connection to a [`MatchingServer`](super::MatchingServer).
///
/// Requests may be pipelined with [`send_raw`](Self::send_raw); reports come
/// back in the order the frames were sent.
pub struct MatchingClient {
    framed: Framed<TcpStream, LineFrameCodec>,
}

impl MatchingClient {
    pub async fn connect(addr: impl ToSocketAddrs) -> TransportResult<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;

        Ok(Self {
            framed: Framed::new(stream, LineFrameCodec::new(DEFAULT_MAX_FRAME_LENGTH)),
        })
    }

    /// Send a command and wait for its execution report
    pub async fn submit(&mut self, command: &MarketOrderCommand) -> TransportResult<ExecutionOutcome> {
        let line = encode_command(command)?;
        self.submit_raw(&line).await
    }

    /// Send an arbitrary line and wait for the report it produces
    pub async fn submit_raw(&mut self, line: &str) -> TransportResult<ExecutionOutcome> {
        self.send_raw(line).await?;
        self.recv().await
    }

    /// Write one line without waiting for a reply
    pub async fn send_raw(&mut self, line: &str) -> TransportResult<()> {
        self.framed.send(line).await?;
        Ok(())
    }

    /// Read the next execution report
    pub async fn recv(&mut self) -> TransportResult<ExecutionOutcome> {
        match self.framed.next().await {
            Some(Ok(Frame::Line(line))) => decode_outcome(&line),
            Some(Ok(Frame::Oversized)) => {
                Err(TransportError::UnexpectedFrame("oversized response".into()))
            },
            Some(Ok(Frame::NotUtf8)) => {
                Err(TransportError::UnexpectedFrame("response is not valid UTF-8".into()))
            },
            Some(Err(e)) => Err(e.into()),
            None => Err(TransportError::ConnectionClosed),
        }
    }
}
