//! Multi-peer peer table shared by every pattern socket.
//!
//! The teacher's `RouterHub`/`PubSubHub` manage peers as `HashMap<_, Sender<PeerCmd>>`
//! talking to a separately spawned actor task per connection. This module keeps
//! the same map-of-peers shape and the same self-healing round-robin cursor
//! (`pick_rr_peer`) but holds each peer's actual `SocketBase<S>` engine directly
//! instead of a channel to a task, so every pattern socket — not just ROUTER and
//! PUB/SUB — gets fair-queued reads and load-balanced writes over N connections
//! from a single poll loop.
//!
//! `fair-queue` (recv) and `load-balance` (send) each keep their own cursor so a
//! socket that both reads and writes round-robin doesn't have one direction
//! starve the other.

use std::collections::HashMap;

use bytes::Bytes;
use compio::io::{AsyncRead, AsyncWrite};

use crate::base::SocketBase;

/// Opaque per-connection identifier, stable for the lifetime of the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(u64);

/// Table of connected peers for a socket that fans out over more than one
/// connection (every pattern except single-peer PAIR).
pub struct PeerTable<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    peers: HashMap<PeerId, SocketBase<S>>,
    /// Insertion order, used as the round-robin rotation list. A `Vec` rather
    /// than iterating the `HashMap` directly keeps the rotation order stable
    /// instead of depending on hash bucket order, matching the teacher's
    /// `lb_list` approach in `RouterHub`.
    order: Vec<PeerId>,
    next_id: u64,
    fair_cursor: usize,
    lb_cursor: usize,
    /// ROUTER-style identity -> peer lookup. Empty for patterns that don't
    /// address peers by identity.
    identities: HashMap<Bytes, PeerId>,
    reverse_identities: HashMap<PeerId, Bytes>,
}

impl<S> Default for PeerTable<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    fn default() -> Self {
        Self {
            peers: HashMap::new(),
            order: Vec::new(),
            next_id: 0,
            fair_cursor: 0,
            lb_cursor: 0,
            identities: HashMap::new(),
            reverse_identities: HashMap::new(),
        }
    }
}

impl<S> PeerTable<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly handshaken peer and return its id.
    pub fn attach(&mut self, base: SocketBase<S>) -> PeerId {
        self.next_id += 1;
        let id = PeerId(self.next_id);
        self.peers.insert(id, base);
        self.order.push(id);
        id
    }

    /// Associate a ROUTER-style wire identity with an already-attached peer.
    /// Re-attaching the same identity replaces the old mapping, matching
    /// libzmq's "last writer wins" behavior for duplicate identities.
    pub fn set_identity(&mut self, id: PeerId, identity: Bytes) {
        if let Some(old) = self.reverse_identities.insert(id, identity.clone()) {
            self.identities.remove(&old);
        }
        self.identities.insert(identity, id);
    }

    #[must_use]
    pub fn id_for_identity(&self, identity: &[u8]) -> Option<PeerId> {
        self.identities.get(identity).copied()
    }

    #[must_use]
    pub fn identity_for(&self, id: PeerId) -> Option<&Bytes> {
        self.reverse_identities.get(&id)
    }

    pub fn detach(&mut self, id: PeerId) -> Option<SocketBase<S>> {
        self.order.retain(|p| *p != id);
        if let Some(identity) = self.reverse_identities.remove(&id) {
            self.identities.remove(&identity);
        }
        if self.fair_cursor >= self.order.len() {
            self.fair_cursor = 0;
        }
        if self.lb_cursor >= self.order.len() {
            self.lb_cursor = 0;
        }
        self.peers.remove(&id)
    }

    #[must_use]
    pub fn get_mut(&mut self, id: PeerId) -> Option<&mut SocketBase<S>> {
        self.peers.get_mut(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    #[must_use]
    pub fn ids(&self) -> impl Iterator<Item = PeerId> + '_ {
        self.order.iter().copied()
    }

    /// Drop any peer whose underlying stream has disconnected, mirroring the
    /// cleanup `RouterHub::handle_peer_event`'s `PeerDown` branch performs.
    pub fn reap_disconnected(&mut self) -> Vec<PeerId> {
        let dead: Vec<PeerId> = self
            .peers
            .iter()
            .filter(|(_, base)| !base.is_connected())
            .map(|(id, _)| *id)
            .collect();
        for id in &dead {
            self.detach(*id);
        }
        dead
    }

    /// Next peer to try reading from, rotating the cursor forward so every
    /// peer gets a fair share of attention rather than always draining the
    /// first-attached one (the fair-queue discipline of `ZMQ_SUB`/`ZMQ_PULL`
    /// with multiple peers).
    pub fn next_read_candidate(&mut self) -> Option<PeerId> {
        self.advance(false)
    }

    /// Next peer to write to, used by load-balancing patterns (DEALER,
    /// PUSH). Self-healing: if the cursor lands past the current peer
    /// count (peers removed concurrently), it wraps to 0 rather than
    /// panicking, matching `RouterHub::pick_rr_peer`.
    pub fn next_write_candidate(&mut self) -> Option<PeerId> {
        self.advance(true)
    }

    fn advance(&mut self, for_write: bool) -> Option<PeerId> {
        if self.order.is_empty() {
            return None;
        }
        let cursor = if for_write {
            &mut self.lb_cursor
        } else {
            &mut self.fair_cursor
        };
        if *cursor >= self.order.len() {
            *cursor = 0;
        }
        let id = self.order[*cursor];
        *cursor = (*cursor + 1) % self.order.len();
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_yields_no_candidates() {
        let mut table: PeerTable<compio::net::TcpStream> = PeerTable::new();
        assert_eq!(table.next_write_candidate(), None);
        assert_eq!(table.next_read_candidate(), None);
        assert!(table.is_empty());
    }

    #[test]
    fn identity_map_starts_empty() {
        let table: PeerTable<compio::net::TcpStream> = PeerTable::new();
        assert_eq!(table.id_for_identity(b"peer-a"), None);
    }
}
