//! PULL socket implementation
//!
//! PULL sockets are receive-only endpoints in the pipeline pattern. They receive
//! messages from connected PUSH sockets in a fair-queued manner.
//!
//! # Characteristics
//!
//! - **Receive-only**: Cannot send messages
//! - **Fair-queued**: Receives from all PUSH sockets fairly
//! - **Pipeline pattern**: For receiving tasks from distributors
//! - **No filtering**: All messages are delivered
//!
//! # Use Cases
//!
//! - Task receiver (worker pattern)
//! - Parallel pipeline processing
//! - Work queue consumption

use std::collections::HashMap;
use std::io;

use bytes::Bytes;
use compio::io::{AsyncRead, AsyncWrite};
use compio::net::TcpStream;
use monocoque_core::config::BufferConfig;
use monocoque_core::options::SocketOptions;
use tracing::{debug, trace};

use crate::base::SocketBase;
use crate::engine::{self, DEFAULT_POLL_TIMEOUT};
use crate::handshake::perform_handshake_with_timeout;
use crate::multipart::MultipartBuffer;
use crate::peers::{PeerId, PeerTable};
use crate::session::SocketType;

/// PULL socket for receiving messages in a pipeline.
///
/// Fair-queues reads across every connected PUSH peer via [`PeerTable`],
/// rather than the single connection the teacher's version was limited to.
pub struct PullSocket<S = TcpStream>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    peers: PeerTable<S>,
    partials: HashMap<PeerId, MultipartBuffer>,
    options: SocketOptions,
    config: BufferConfig,
    read_cursor: usize,
}

impl<S> PullSocket<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Create an empty PULL socket ready to accept PUSH peers.
    #[must_use]
    pub fn new(options: SocketOptions, config: BufferConfig) -> Self {
        Self {
            peers: PeerTable::new(),
            partials: HashMap::new(),
            options,
            config,
            read_cursor: 0,
        }
    }

    /// Perform the ZMTP handshake on `stream` and register it as a source.
    pub async fn attach(&mut self, mut stream: S) -> io::Result<PeerId> {
        debug!("[PULL] Performing ZMTP handshake with new peer");
        perform_handshake_with_timeout(
            &mut stream,
            SocketType::Pull,
            None,
            Some(self.options.handshake_timeout),
        )
        .await
        .map_err(|e| io::Error::other(format!("handshake failed: {e}")))?;

        let base = SocketBase::new(stream, SocketType::Pull, self.config, self.options.clone());
        let id = self.peers.attach(base);
        self.partials
            .insert(id, MultipartBuffer::new(engine::DEFAULT_MAX_FRAMES, engine::DEFAULT_MAX_BYTES));
        debug!(peers = self.peers.len(), "[PULL] peer attached");
        Ok(id)
    }

    /// Receive a message, fair-queued across every connected PUSH peer.
    ///
    /// Returns `Ok(None)` if no peer has a message ready right now.
    pub async fn recv(&mut self) -> io::Result<Option<Vec<Bytes>>> {
        if self.peers.is_empty() {
            return Ok(None);
        }
        let ids: Vec<PeerId> = self.peers.ids().collect();
        let start = self.read_cursor % ids.len();
        self.read_cursor = (self.read_cursor + 1) % ids.len();

        for offset in 0..ids.len() {
            let id = ids[(start + offset) % ids.len()];
            let partial = self
                .partials
                .entry(id)
                .or_insert_with(|| MultipartBuffer::new(engine::DEFAULT_MAX_FRAMES, engine::DEFAULT_MAX_BYTES));
            let Some(base) = self.peers.get_mut(id) else { continue };
            match engine::poll_recv_multipart(base, partial, DEFAULT_POLL_TIMEOUT).await {
                Ok(Some(msg)) => {
                    trace!(peer = ?id, frames = msg.len(), "[PULL] received message");
                    return Ok(Some(msg));
                }
                Ok(None) => continue,
                Err(e) => {
                    trace!(peer = ?id, error = %e, "[PULL] peer read error, detaching");
                    self.peers.detach(id);
                    self.partials.remove(&id);
                }
            }
        }
        for id in self.peers.reap_disconnected() {
            self.partials.remove(&id);
        }
        Ok(None)
    }

    #[must_use]
    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Get a reference to the socket options.
    #[must_use]
    pub const fn options(&self) -> &SocketOptions {
        &self.options
    }

    /// Get a mutable reference to the socket options.
    pub fn options_mut(&mut self) -> &mut SocketOptions {
        &mut self.options
    }
}

impl PullSocket<TcpStream> {
    /// Create an empty PULL socket, ready for `accept_tcp`.
    #[must_use]
    pub fn bind() -> Self {
        Self::new(SocketOptions::default(), BufferConfig::default())
    }

    /// Accept a freshly connected TCP stream, enabling `TCP_NODELAY` first.
    pub async fn accept_tcp(&mut self, stream: TcpStream) -> io::Result<PeerId> {
        monocoque_core::tcp::enable_tcp_nodelay(&stream)?;
        self.attach(stream).await
    }

    /// Connect to a PUSH socket and add it as a source.
    pub async fn connect(addr: &str) -> io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        monocoque_core::tcp::enable_tcp_nodelay(&stream)?;
        let mut socket = Self::bind();
        socket.attach(stream).await?;
        Ok(socket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pull_has_no_peers() {
        let socket: PullSocket<TcpStream> = PullSocket::new(SocketOptions::default(), BufferConfig::default());
        assert_eq!(socket.peer_count(), 0);
    }
}
