//! PUSH socket implementation
//!
//! PUSH sockets are send-only endpoints in the pipeline pattern. They distribute
//! messages in a round-robin fashion to connected PULL sockets.
//!
//! # Characteristics
//!
//! - **Send-only**: Cannot receive messages
//! - **Load balancing**: Distributes work across PULL sockets
//! - **Non-blocking**: Never blocks on slow receivers (drops if HWM reached)
//! - **Pipeline pattern**: For distributing tasks to workers
//!
//! # Use Cases
//!
//! - Task distribution (ventilator pattern)
//! - Parallel pipeline processing
//! - Work queue distribution

use std::io;

use bytes::Bytes;
use compio::io::{AsyncRead, AsyncWrite};
use compio::net::TcpStream;
use monocoque_core::config::BufferConfig;
use monocoque_core::options::SocketOptions;
use tracing::{debug, trace};

use crate::base::SocketBase;
use crate::engine;
use crate::handshake::perform_handshake_with_timeout;
use crate::peers::PeerTable;
use crate::session::SocketType;

/// PUSH socket for distributing messages in a pipeline.
///
/// Load-balances sends round-robin across every connected PULL peer via
/// [`PeerTable`], rather than the single connection the teacher's version
/// was limited to.
pub struct PushSocket<S = TcpStream>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    peers: PeerTable<S>,
    options: SocketOptions,
    config: BufferConfig,
}

impl<S> PushSocket<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Create an empty PUSH socket ready to accept PULL peers.
    #[must_use]
    pub fn new(options: SocketOptions, config: BufferConfig) -> Self {
        Self {
            peers: PeerTable::new(),
            options,
            config,
        }
    }

    /// Perform the ZMTP handshake on `stream` and register it as a destination.
    pub async fn attach(&mut self, mut stream: S) -> io::Result<()> {
        debug!("[PUSH] Performing ZMTP handshake with new peer");
        perform_handshake_with_timeout(
            &mut stream,
            SocketType::Push,
            None,
            Some(self.options.handshake_timeout),
        )
        .await
        .map_err(|e| io::Error::other(format!("handshake failed: {e}")))?;

        let base = SocketBase::new(stream, SocketType::Push, self.config, self.options.clone());
        self.peers.attach(base);
        debug!(peers = self.peers.len(), "[PUSH] peer attached");
        Ok(())
    }

    /// Send a message to the next PULL peer in round-robin order.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` if no peer is attached.
    pub async fn send(&mut self, msg: Vec<Bytes>) -> io::Result<()> {
        let Some(id) = self.peers.next_write_candidate() else {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "no PULL peer connected"));
        };
        let Some(base) = self.peers.get_mut(id) else {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "peer vanished"));
        };
        trace!(peer = ?id, frames = msg.len(), "[PUSH] sending message");
        engine::send_multipart(base, &msg).await?;
        for id in self.peers.reap_disconnected() {
            trace!(peer = ?id, "[PUSH] reaped disconnected peer");
        }
        Ok(())
    }

    /// PUSH sockets are send-only; matches libzmq's `ENOTSUP` for `zmq_recv`
    /// on a `ZMQ_PUSH` socket.
    pub async fn recv(&mut self) -> io::Result<Option<Vec<Bytes>>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "PUSH sockets do not support recv",
        ))
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

impl PushSocket<TcpStream> {
    /// Create an empty PUSH socket, ready for `connect`/`accept_tcp`.
    #[must_use]
    pub fn bind() -> Self {
        Self::new(SocketOptions::default(), BufferConfig::default())
    }

    /// Accept a freshly connected TCP stream, enabling `TCP_NODELAY` first.
    pub async fn accept_tcp(&mut self, stream: TcpStream) -> io::Result<()> {
        monocoque_core::tcp::enable_tcp_nodelay(&stream)?;
        self.attach(stream).await
    }

    /// Connect to a PULL socket and add it as a destination.
    pub async fn connect(addr: &str) -> io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        monocoque_core::tcp::enable_tcp_nodelay(&stream)?;
        let mut socket = Self::bind();
        socket.attach(stream).await?;
        Ok(socket)
    }
}

crate::impl_socket_trait!(PushSocket<S>, SocketType::Push);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_push_has_no_peers() {
        let socket: PushSocket<TcpStream> = PushSocket::new(SocketOptions::default(), BufferConfig::default());
        assert_eq!(socket.peer_count(), 0);
    }
}
