//! XSUB (Extended Subscriber) socket implementation
//!
//! XSUB extends SUB by sending subscription messages upstream to publishers,
//! enabling subscription forwarding in message brokers and dynamic subscription
//! management.
//!
//! # Use Cases
//!
//! - **Message brokers**: Forward subscriptions from frontend to backend
//! - **Cascading pub/sub**: Build subscription trees across network boundaries
//! - **Dynamic subscriptions**: Programmatically manage topic interests
//!
//! # Pattern
//!
//! ```text
//! XSUB ──subscribe("topic.a")──> Publisher
//!      <──────data("topic.a")───
//! XSUB ──subscribe("topic.b")──> Publisher
//!      <──────data("topic.b")───
//! ```
//!
//! Unlike the teacher's single-connection XSUB (whose `recv()` was a stub
//! returning `Ok(None)` unconditionally), this connects to any number of
//! publishers: a subscription is broadcast to every connected peer, and
//! `recv()` fair-queues data across all of them via [`PeerTable`].

use std::collections::HashMap;
use std::io;

use bytes::Bytes;
use compio::io::{AsyncRead, AsyncWrite};
use compio::net::TcpStream;
use monocoque_core::config::BufferConfig;
use monocoque_core::options::SocketOptions;
use monocoque_core::subscription::{SubscriptionEvent, SubscriptionTrie};
use tracing::{debug, trace};

use crate::base::SocketBase;
use crate::engine::{self, DEFAULT_POLL_TIMEOUT};
use crate::handshake::perform_handshake_with_timeout;
use crate::multipart::MultipartBuffer;
use crate::peers::{PeerId, PeerTable};
use crate::session::SocketType;

/// XSUB (Extended Subscriber) socket, connected to zero or more publishers.
pub struct XSubSocket<S = TcpStream>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    peers: PeerTable<S>,
    partials: HashMap<PeerId, MultipartBuffer>,
    subscriptions: SubscriptionTrie,
    options: SocketOptions,
    config: BufferConfig,
    read_cursor: usize,
}

impl<S> XSubSocket<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    #[must_use]
    pub fn new(options: SocketOptions, config: BufferConfig) -> Self {
        Self {
            peers: PeerTable::new(),
            partials: HashMap::new(),
            subscriptions: SubscriptionTrie::new(),
            options,
            config,
            read_cursor: 0,
        }
    }

    /// Perform the ZMTP handshake on `stream` and add it as a publisher peer.
    /// Every subscription currently held is replayed to the new peer so it
    /// starts in sync with the others (libzmq does the same on reconnect).
    pub async fn attach(&mut self, mut stream: S) -> io::Result<PeerId> {
        perform_handshake_with_timeout(
            &mut stream,
            SocketType::XSub,
            None,
            Some(self.options.handshake_timeout),
        )
        .await
        .map_err(|e| io::Error::other(format!("handshake failed: {e}")))?;

        let mut base = SocketBase::new(stream, SocketType::XSub, self.config, self.options.clone());
        for sub in self.subscriptions.subscriptions() {
            let event = SubscriptionEvent::Subscribe(sub.prefix().clone());
            write_subscription(&mut base, &event).await?;
        }
        let id = self.peers.attach(base);
        self.partials.insert(id, MultipartBuffer::new(engine::DEFAULT_MAX_FRAMES, engine::DEFAULT_MAX_BYTES));
        debug!(peers = self.peers.len(), "[XSUB] peer attached");
        Ok(id)
    }

    /// Subscribe to messages with the given prefix, broadcasting the
    /// subscription to every connected publisher.
    pub async fn subscribe(&mut self, prefix: impl Into<Bytes>) -> io::Result<()> {
        let prefix = prefix.into();
        trace!(?prefix, "[XSUB] subscribing");
        self.subscriptions.subscribe(prefix.clone());
        self.broadcast_subscription(SubscriptionEvent::Subscribe(prefix)).await
    }

    /// Unsubscribe from messages with the given prefix.
    pub async fn unsubscribe(&mut self, prefix: impl Into<Bytes>) -> io::Result<()> {
        let prefix = prefix.into();
        trace!(?prefix, "[XSUB] unsubscribing");
        self.subscriptions.unsubscribe(&prefix);
        self.broadcast_subscription(SubscriptionEvent::Unsubscribe(prefix)).await
    }

    /// Forward a raw subscription event upstream to every peer (for proxies
    /// relaying subscriptions from a frontend XPUB).
    pub async fn send_subscription_event(&mut self, event: SubscriptionEvent) -> io::Result<()> {
        self.broadcast_subscription(event).await
    }

    async fn broadcast_subscription(&mut self, event: SubscriptionEvent) -> io::Result<()> {
        let ids: Vec<PeerId> = self.peers.ids().collect();
        for id in ids {
            if let Some(base) = self.peers.get_mut(id) {
                write_subscription(base, &event).await?;
            }
        }
        Ok(())
    }

    /// Receive one data message, fair-queued across every connected
    /// publisher. Returns `Ok(None)` if no peer produced a message within
    /// one rotation and no peer is connected, and reaps any peer whose
    /// stream has disconnected.
    pub async fn recv(&mut self) -> io::Result<Option<Vec<Bytes>>> {
        loop {
            if self.peers.is_empty() {
                return Ok(None);
            }
            let ids: Vec<PeerId> = self.peers.ids().collect();
            let start = self.read_cursor % ids.len();
            self.read_cursor = (self.read_cursor + 1) % ids.len().max(1);

            for offset in 0..ids.len() {
                let id = ids[(start + offset) % ids.len()];
                let partial = self
                    .partials
                    .entry(id)
                    .or_insert_with(|| MultipartBuffer::new(engine::DEFAULT_MAX_FRAMES, engine::DEFAULT_MAX_BYTES));
                let Some(base) = self.peers.get_mut(id) else { continue };
                match engine::poll_recv_multipart(base, partial, DEFAULT_POLL_TIMEOUT).await {
                    Ok(Some(msg)) => return Ok(Some(msg)),
                    Ok(None) => continue,
                    Err(e) => {
                        trace!(error = %e, "[XSUB] peer read error, detaching");
                        self.peers.detach(id);
                        self.partials.remove(&id);
                    }
                }
            }
            let dead = self.peers.reap_disconnected();
            for id in dead {
                self.partials.remove(&id);
            }
            if self.peers.is_empty() {
                return Ok(None);
            }
            // One full rotation produced nothing live; give the caller a
            // chance to interleave other work instead of spinning tightly.
            return Ok(None);
        }
    }

    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    #[must_use]
    pub fn is_subscribed(&self, topic: &[u8]) -> bool {
        self.subscriptions.matches(topic)
    }

    #[must_use]
    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    #[must_use]
    pub const fn socket_type(&self) -> SocketType {
        SocketType::XSub
    }
}

async fn write_subscription<S>(base: &mut SocketBase<S>, event: &SubscriptionEvent) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let msg = event.to_message();
    engine::send_multipart(base, std::slice::from_ref(&msg)).await
}

impl XSubSocket<TcpStream> {
    /// Connect to a publisher and add it as a peer.
    pub async fn connect(addr: &str) -> io::Result<Self> {
        Self::connect_with_options(addr, SocketOptions::default(), BufferConfig::large()).await
    }

    pub async fn connect_with_options(
        addr: &str,
        options: SocketOptions,
        config: BufferConfig,
    ) -> io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        monocoque_core::tcp::enable_tcp_nodelay(&stream)?;
        let mut socket = Self::new(options, config);
        socket.attach(stream).await?;
        Ok(socket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_event_wire_format() {
        let event = SubscriptionEvent::Subscribe(Bytes::from_static(b"topic"));
        let msg = event.to_message();
        assert_eq!(msg[0], 0x01);
        assert_eq!(&msg[1..], b"topic");
    }

    #[test]
    fn empty_socket_reports_no_peers() {
        let socket: XSubSocket<TcpStream> = XSubSocket::new(SocketOptions::default(), BufferConfig::default());
        assert_eq!(socket.peer_count(), 0);
        assert_eq!(socket.subscription_count(), 0);
    }
}
