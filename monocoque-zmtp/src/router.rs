//! Direct-stream ROUTER socket implementation
//!
//! This module provides a high-performance ROUTER socket using direct stream I/O
//! for minimal latency.
//!
//! # ROUTER Pattern
//!
//! ROUTER sockets accept any number of peers and receive messages with the
//! sender's identity prepended. Replies are addressed back to a specific peer
//! by the same identity frame. Unlike the teacher's version (which only ever
//! held one connection), this fans out over a [`PeerTable`] so a bound ROUTER
//! can serve many DEALER/REQ clients at once.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};

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

static PEER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Multi-peer ROUTER socket.
pub struct RouterSocket<S = TcpStream>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    peers: PeerTable<S>,
    partials: HashMap<PeerId, MultipartBuffer>,
    options: SocketOptions,
    config: BufferConfig,
    read_cursor: usize,
}

impl<S> RouterSocket<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Create an empty ROUTER socket with large buffer configuration (16KB),
    /// ready to accept peers via [`Self::accept`].
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

    /// Perform the ZMTP handshake on a freshly accepted `stream` and register
    /// it as a routable peer. The peer's wire identity comes from its READY
    /// command if it set one (`ZMQ_ROUTING_ID`), otherwise an identity is
    /// auto-generated, matching libzmq's anonymous-peer behavior.
    pub async fn accept(&mut self, mut stream: S) -> io::Result<PeerId> {
        debug!("[ROUTER] Performing ZMTP handshake with new peer");
        let handshake_result = perform_handshake_with_timeout(
            &mut stream,
            SocketType::Router,
            None,
            Some(self.options.handshake_timeout),
        )
        .await
        .map_err(|e| io::Error::other(format!("handshake failed: {e}")))?;

        let identity = handshake_result.peer_identity.unwrap_or_else(|| {
            let n = PEER_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
            Bytes::from(format!("peer-{n}"))
        });

        let base = SocketBase::new(stream, SocketType::Router, self.config, self.options.clone());
        let id = self.peers.attach(base);
        self.peers.set_identity(id, identity.clone());
        self.partials
            .insert(id, MultipartBuffer::new(engine::DEFAULT_MAX_FRAMES, engine::DEFAULT_MAX_BYTES));

        debug!(?identity, peers = self.peers.len(), "[ROUTER] peer registered");
        Ok(id)
    }

    /// Receive a message with the sender identity prepended as the first
    /// frame, fair-queued across every connected peer.
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
                    let identity = self.peers.identity_for(id).cloned().unwrap_or_default();
                    let mut frames = Vec::with_capacity(msg.len() + 1);
                    frames.push(identity);
                    frames.extend(msg);
                    trace!(peer = ?id, frames = frames.len(), "[ROUTER] received message");
                    return Ok(Some(frames));
                }
                Ok(None) => continue,
                Err(e) => {
                    trace!(peer = ?id, error = %e, "[ROUTER] peer read error, detaching");
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

    /// Send a message whose first frame is the destination identity.
    ///
    /// If the identity doesn't match any connected peer: silently drops the
    /// message (libzmq's default ROUTER behavior), unless `ZMQ_ROUTER_MANDATORY`
    /// is set on the socket, in which case this returns
    /// [`monocoque_core::error::Error::HostUnreachable`].
    pub async fn send(&mut self, msg: Vec<Bytes>) -> io::Result<()> {
        let Some((identity, rest)) = msg.split_first() else {
            return Ok(());
        };

        let Some(id) = self.peers.id_for_identity(identity) else {
            if self.options.router_mandatory {
                return Err(io::Error::other(monocoque_core::error::Error::HostUnreachable));
            }
            trace!(?identity, "[ROUTER] dropping message to unknown peer");
            return Ok(());
        };

        let Some(base) = self.peers.get_mut(id) else {
            if self.options.router_mandatory {
                return Err(io::Error::other(monocoque_core::error::Error::HostUnreachable));
            }
            return Ok(());
        };

        engine::send_multipart(base, rest).await?;
        trace!(?identity, frames = rest.len(), "[ROUTER] message sent");
        Ok(())
    }

    /// Number of currently connected peers.
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

impl RouterSocket<TcpStream> {
    /// Create a new ROUTER socket, to be bound and have peers `accept()`-ed
    /// by the caller's listener loop.
    #[must_use]
    pub fn bind() -> Self {
        Self::new(SocketOptions::default(), BufferConfig::large())
    }

    /// Accept a freshly connected TCP stream, enabling `TCP_NODELAY` first.
    pub async fn accept_tcp(&mut self, stream: TcpStream) -> io::Result<PeerId> {
        monocoque_core::tcp::enable_tcp_nodelay(&stream)?;
        self.accept(stream).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_router_has_no_peers() {
        let router: RouterSocket<TcpStream> = RouterSocket::new(SocketOptions::default(), BufferConfig::large());
        assert_eq!(router.peer_count(), 0);
    }
}
