//! PUB socket implementation.

use bytes::Bytes;
use compio::net::TcpListener;
use monocoque_core::monitor::{create_monitor, SocketEvent, SocketEventSender, SocketMonitor};
use monocoque_zmtp::publisher::PubSocket as InternalPub;
use monocoque_zmtp::SocketType;
use std::io;

/// A PUB socket for broadcasting messages to a subscriber.
///
/// The internal PUB socket is a single direct-stream connection (see
/// `monocoque_zmtp::publisher::PubSocket`); fanning a bind out to many
/// concurrent subscribers isn't wired up yet, so this facade accepts one
/// subscriber connection at a time.
///
/// ## Example
///
/// ```rust,no_run
/// use monocoque::zmq::PubSocket;
/// use bytes::Bytes;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut socket = PubSocket::bind("127.0.0.1:5555").await?;
/// socket.accept_subscriber().await?;
///
/// socket.send(vec![Bytes::from("topic"), Bytes::from("data")]).await?;
/// # Ok(())
/// # }
/// ```
pub struct PubSocket {
    inner: Option<InternalPub>,
    listener: TcpListener,
    monitor: Option<SocketEventSender>,
}

impl PubSocket {
    /// Bind to an address and start listening for a subscriber.
    pub async fn bind(addr: impl compio::net::ToSocketAddrsAsync) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            inner: None,
            listener,
            monitor: None,
        })
    }

    /// Accept the next subscriber connection, performing the ZMTP handshake.
    ///
    /// Replaces any previously accepted subscriber.
    pub async fn accept_subscriber(&mut self) -> io::Result<()> {
        let (stream, addr) = self.listener.accept().await?;
        monocoque_core::tcp::enable_tcp_nodelay(&stream)?;
        self.inner = Some(InternalPub::new(stream).await?);
        self.emit_event(SocketEvent::Connected(monocoque_core::endpoint::Endpoint::Tcp(addr)));
        Ok(())
    }

    /// Broadcast a multipart message to the connected subscriber.
    ///
    /// The first frame is typically used as a topic for subscription
    /// filtering on the receiving side.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` if no subscriber has been accepted yet.
    pub async fn send(&mut self, msg: Vec<Bytes>) -> io::Result<()> {
        match self.inner.as_mut() {
            Some(inner) => inner.send(msg).await,
            None => Err(io::Error::new(io::ErrorKind::NotConnected, "no subscriber connected")),
        }
    }

    /// Get the number of active subscribers (0 or 1).
    pub fn subscriber_count(&self) -> usize {
        usize::from(self.inner.is_some())
    }

    /// Get the local address this socket is bound to.
    pub fn local_addr(&self) -> io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Get the socket type.
    ///
    /// # ZeroMQ Compatibility
    ///
    /// Corresponds to `ZMQ_TYPE` (16) option.
    #[inline]
    pub fn socket_type() -> SocketType {
        SocketType::Pub
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
}
