//! TCP server speaking newline-delimited JSON
//!
//! Every connection runs in its own task. Frames on one connection are
//! handled strictly in order, one execution report per inbound line, and
//! the engine is shared by all connections.

use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::codec::{encode_outcome, resolve_frame, LineFrameCodec};
use super::config::ServerConfig;
use super::error::{TransportError, TransportResult};
use crate::engine::MatchingEngine;

/// Identifier assigned to each accepted connection, for logging
pub type ConnectionId = u64;

/// Pause after a failed `accept` before polling the listener again
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Bound TCP front end for a [`MatchingEngine`]
///
/// # Example
///
/// ```no_run
/// use market_order_matcher::prelude::*;
/// use market_order_matcher::transport::{MatchingServer, ServerConfig};
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn serve() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = create_from_config(EngineConfig::reference_book(), Arc::new(NoOpEventHandler))?;
/// let server = MatchingServer::bind(ServerConfig::default(), Arc::new(engine)).await?;
///
/// let shutdown = CancellationToken::new();
/// server.run(shutdown.clone()).await?;
/// # Ok(())
/// # }
/// ```
pub struct MatchingServer {
    config: ServerConfig,
    listener: TcpListener,
    local_addr: SocketAddr,
    engine: Arc<MatchingEngine>,
    next_conn_id: AtomicU64,
}

impl MatchingServer {
    /// Validate the configuration and bind the listening socket
    pub async fn bind(config: ServerConfig, engine: Arc<MatchingEngine>) -> TransportResult<Self> {
        config.validate()?;

        let address = config.address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|e| TransportError::bind(address.clone(), e))?;
        let local_addr = listener.local_addr()?;

        info!(%local_addr, algorithm = engine.algorithm_name(), "matching server listening");

        Ok(Self {
            config,
            listener,
            local_addr,
            engine,
            next_conn_id: AtomicU64::new(1),
        })
    }

    /// Address actually bound; differs from the configured one when port 0 was requested
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<MatchingEngine> {
        &self.engine
    }

    fn next_connection_id(&self) -> ConnectionId {
        self.next_conn_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Accept connections until `shutdown` is cancelled, then wait for open
    /// connections to finish their current frame and close.
    pub async fn run(self, shutdown: CancellationToken) -> TransportResult<()> {
        let mut connections: Vec<JoinHandle<()>> = Vec::new();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("matching server received shutdown signal");
                    break;
                }

                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer_addr)) => {
                            let conn_id = self.next_connection_id();
                            let engine = Arc::clone(&self.engine);
                            let max_frame_length = self.config.max_frame_length;
                            let conn_token = shutdown.child_token();

                            connections.push(tokio::spawn(async move {
                                if let Err(e) = handle_connection(
                                    conn_id,
                                    stream,
                                    peer_addr,
                                    engine,
                                    max_frame_length,
                                    conn_token,
                                )
                                .await
                                {
                                    warn!(conn_id, %peer_addr, error = %e, "connection closed with error");
                                }
                            }));

                            connections.retain(|handle| !handle.is_finished());
                        }
                        Err(e) => {
                            error!(error = %e, "failed to accept connection");
                            // Errors such as EMFILE persist until a connection closes
                            tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                        }
                    }
                }
            }
        }

        drop(self.listener);

        let open = connections.len();
        if open > 0 {
            debug!(open, "waiting for connections to close");
        }
        for handle in connections {
            if let Err(e) = handle.await {
                error!(error = %e, "connection task failed");
            }
        }

        info!(local_addr = %self.local_addr, "matching server stopped");
        Ok(())
    }
}

async fn handle_connection(
    conn_id: ConnectionId,
    stream: TcpStream,
    peer_addr: SocketAddr,
    engine: Arc<MatchingEngine>,
    max_frame_length: usize,
    shutdown: CancellationToken,
) -> TransportResult<()> {
    debug!(conn_id, %peer_addr, "connection accepted");

    let mut framed = Framed::new(stream, LineFrameCodec::new(max_frame_length));
    let mut frames: u64 = 0;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!(conn_id, "closing connection for shutdown");
                break;
            }

            frame = framed.next() => {
                match frame {
                    Some(Ok(frame)) => {
                        let outcome = resolve_frame(&engine, &frame);
                        framed.send(encode_outcome(&outcome)?).await?;
                        frames += 1;
                    }
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                }
            }
        }
    }

    debug!(conn_id, frames, "connection closed");
    Ok(())
}
