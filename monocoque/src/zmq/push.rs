//! PUSH socket implementation.
//!
//! PUSH sockets are used in pipeline patterns for distributing tasks.

use bytes::Bytes;
use compio::net::{TcpListener, TcpStream};
use monocoque_core::options::SocketOptions;
use monocoque_zmtp::push::PushSocket as InternalPush;
use monocoque_zmtp::SocketType;
use std::io;

/// PUSH socket for distributing tasks in a pipeline.
///
/// PUSH sockets round-robin messages across every connected PULL peer.
pub struct PushSocket {
    inner: InternalPush<TcpStream>,
    listener: Option<TcpListener>,
}

impl PushSocket {
    /// Bind to an address and accept PULL peers on demand via [`Self::accept`].
    pub async fn bind(addr: impl compio::net::ToSocketAddrsAsync) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            inner: InternalPush::bind(),
            listener: Some(listener),
        })
    }

    /// Connect to a single PULL peer.
    pub async fn connect(endpoint: &str) -> io::Result<Self> {
        Ok(Self {
            inner: InternalPush::connect(endpoint).await?,
            listener: None,
        })
    }

    /// Accept the next incoming PULL connection.
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
        self.inner.accept_tcp(stream).await
    }

    /// Attach an already-connected stream as a peer.
    pub async fn attach(&mut self, stream: TcpStream) -> io::Result<()> {
        self.inner.attach(stream).await
    }

    /// Send a message, round-robined across connected peers.
    pub async fn send(&mut self, msg: Vec<Bytes>) -> io::Result<()> {
        self.inner.send(msg).await
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
        SocketType::Push
    }
}
