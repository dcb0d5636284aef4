//! REP socket implementation.

use super::common::channel_to_io_error;
use bytes::Bytes;
use compio::net::{TcpListener, TcpStream};
use monocoque_core::monitor::{create_monitor, SocketEvent, SocketEventSender, SocketMonitor};
use monocoque_zmtp::rep::RepSocket as InternalRep;
use monocoque_zmtp::SocketType;
use std::io;

/// A REP socket for synchronous reply patterns.
///
/// REP sockets enforce strict alternation between receive and send:
/// - Must call `recv()` to get a request
/// - Must call `send()` to reply before next `recv()`
///
/// They're used for:
/// - Synchronous RPC servers
/// - Request-reply protocols
/// - Service endpoints
///
/// ## ZeroMQ Compatibility
///
/// Compatible with `zmq::REQ` and `zmq::REP` sockets from libzmq.
///
/// ## Example
///
/// ```rust,no_run
/// use monocoque::zmq::RepSocket;
/// use bytes::Bytes;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut socket = RepSocket::bind("127.0.0.1:5555").await?;
/// socket.accept().await?;
///
/// loop {
///     if let Some(request) = socket.recv().await {
///         println!("Got request: {:?}", request);
///         socket.send(vec![Bytes::from("REPLY")]).await?;
///     }
/// }
/// # }
/// ```
pub struct RepSocket {
    inner: Option<InternalRep>,
    listener: Option<TcpListener>,
    monitor: Option<SocketEventSender>,
}

impl RepSocket {
    /// Bind to an address and listen for the client connection.
    pub async fn bind(addr: impl compio::net::ToSocketAddrsAsync) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            inner: None,
            listener: Some(listener),
            monitor: None,
        })
    }

    /// Accept the next incoming connection, performing the ZMTP handshake.
    ///
    /// Replaces any previously accepted client.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if this socket was created via
    /// [`Self::from_stream`] rather than [`Self::bind`].
    pub async fn accept(&mut self) -> io::Result<()> {
        let Some(listener) = self.listener.as_ref() else {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "socket was not bound"));
        };
        let (stream, addr) = listener.accept().await?;
        monocoque_core::tcp::enable_tcp_nodelay(&stream)?;
        self.inner = Some(InternalRep::new(stream).await);
        self.emit_event(SocketEvent::Connected(monocoque_core::endpoint::Endpoint::Tcp(addr)));
        Ok(())
    }

    /// Create a REP socket from an existing TCP stream.
    pub async fn from_stream(stream: TcpStream) -> io::Result<Self> {
        monocoque_core::tcp::enable_tcp_nodelay(&stream)?;
        Ok(Self {
            inner: Some(InternalRep::new(stream).await),
            listener: None,
            monitor: None,
        })
    }

    /// Enable monitoring for this socket.
    ///
    /// Returns a receiver for socket lifecycle events.
    pub fn monitor(&mut self) -> SocketMonitor {
        let (sender, receiver) = create_monitor();
        self.monitor = Some(sender);
        receiver
    }

    /// Helper to emit monitoring events (if monitoring is enabled).
    #[allow(dead_code)]
    fn emit_event(&self, event: SocketEvent) {
        if let Some(monitor) = &self.monitor {
            let _ = monitor.send(event);
        }
    }

    /// Receive a request message.
    ///
    /// This blocks until a request is received.
    ///
    /// Returns `None` if no client has been accepted yet, or the connection
    /// closed.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use monocoque::zmq::RepSocket;
    ///
    /// # async fn example(socket: &mut RepSocket) -> std::io::Result<()> {
    /// if let Some(request) = socket.recv().await {
    ///     for (i, frame) in request.iter().enumerate() {
    ///         println!("Frame {}: {:?}", i, frame);
    ///     }
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn recv(&mut self) -> Option<Vec<Bytes>> {
        match self.inner.as_ref() {
            Some(inner) => inner.recv().await.ok().flatten(),
            None => None,
        }
    }

    /// Send a reply message.
    ///
    /// This must be called after `recv()`.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` if no client has been accepted yet, or an I/O
    /// error if the underlying connection is closed.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use monocoque::zmq::RepSocket;
    /// use bytes::Bytes;
    ///
    /// # async fn example(socket: &mut RepSocket) -> std::io::Result<()> {
    /// socket.send(vec![Bytes::from("OK")]).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn send(&mut self, msg: Vec<Bytes>) -> io::Result<()> {
        match self.inner.as_ref() {
            Some(inner) => channel_to_io_error(inner.send(msg).await),
            None => Err(io::Error::new(io::ErrorKind::NotConnected, "no client connected")),
        }
    }

    /// Get the socket type.
    ///
    /// # ZeroMQ Compatibility
    ///
    /// Corresponds to `ZMQ_TYPE` (16) option.
    #[inline]
    pub fn socket_type() -> SocketType {
        SocketType::Rep
    }
}
