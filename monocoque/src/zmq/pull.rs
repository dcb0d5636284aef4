//! PULL socket implementation.
//!
//! PULL sockets are used in pipeline patterns for receiving tasks.

use bytes::Bytes;
use compio::net::{TcpListener, TcpStream};
use monocoque_core::options::SocketOptions;
use monocoque_zmtp::pull::PullSocket as InternalPull;
use monocoque_zmtp::SocketType;
use std::io;

/// PULL socket for receiving tasks in a pipeline.
///
/// PULL sockets fair-queue messages from every connected PUSH peer.
pub struct PullSocket {
    inner: InternalPull<TcpStream>,
    listener: Option<TcpListener>,
}

impl PullSocket {
    /// Bind to an address and accept PUSH peers on demand via [`Self::accept`].
    pub async fn bind(addr: impl compio::net::ToSocketAddrsAsync) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            inner: InternalPull::bind(),
            listener: Some(listener),
        })
    }

    /// Connect to a single PUSH peer.
    pub async fn connect(endpoint: &str) -> io::Result<Self> {
        Ok(Self {
            inner: InternalPull::connect(endpoint).await?,
            listener: None,
        })
    }

    /// Accept the next incoming PUSH connection.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if this socket was created via [`Self::connect`]
    /// rather than [`Self::bind`].
    pub async fn accept(&mut self) -> io::Result<()> {
        let Some(listener) = self.listener.as_ref() else {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "socket was not bound"));
        };
        let (stream, _) = listener.accept().await?;
        self.inner.accept_tcp(stream).await?;
        Ok(())
    }

    /// Attach an already-connected stream as a peer.
    pub async fn attach(&mut self, stream: TcpStream) -> io::Result<()> {
        self.inner.attach(stream).await?;
        Ok(())
    }

    /// Receive a message, fair-queued across connected peers.
    ///
    /// Returns `None` if no peer currently has a message ready.
    pub async fn recv(&mut self) -> io::Result<Option<Vec<Bytes>>> {
        self.inner.recv().await
    }

    /// Number of currently connected peers.
    #[inline]
    pub fn peer_count(&self) -> usize {
        self.inner.peer_count()
    }

    /// Get a reference to the socket options.
    #[inline]
    pub const fn options(&self) -> &SocketOptions {
        self.inner.options()
    }

    /// Get a mutable reference to the socket options.
    #[inline]
    pub fn options_mut(&mut self) -> &mut SocketOptions {
        self.inner.options_mut()
    }

    /// Get the socket type.
    ///
    /// # ZeroMQ Compatibility
    ///
    /// Corresponds to `ZMQ_TYPE` (16) option.
    #[inline]
    pub const fn socket_type() -> SocketType {
        SocketType::Pull
    }
}
