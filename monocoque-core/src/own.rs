//! Ownership hierarchy and the termination protocol.
//!
//! Every long-lived object (socket, session, engine, I/O thread) is a node
//! in a tree rooted at the `Context`. Termination is cooperative and
//! serialized through a small command protocol rather than direct
//! cross-thread mutation, matching the rest of this crate's mailbox-only
//! rule for cross-thread communication.
//!
//! There is no grounding for this exact protocol in the teacher crate (it
//! has no ownership tree at all — `compio::runtime::spawn` substitutes for
//! lifecycle management); this module follows the "arena of handles, no
//! back-pointers" redesign guidance instead: every node is addressed by a
//! stable [`NodeId`], never by a reference to another node.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;

/// Stable identifier for a node in the ownership tree. Never reused within
/// a process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

impl NodeId {
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Linger policy applied when a node begins terminating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linger {
    /// Destroy immediately, discarding anything still queued.
    Immediate,
    /// Wait up to the given duration for queued work to drain.
    Timed(Duration),
    /// Wait indefinitely for queued work to drain.
    Infinite,
}

impl Linger {
    #[must_use]
    pub const fn from_millis(ms: i64) -> Self {
        match ms {
            0 => Self::Immediate,
            n if n < 0 => Self::Infinite,
            n => Self::Timed(Duration::from_millis(n as u64)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Live,
    Terminating,
    Terminated,
}

struct NodeState {
    owner: Option<NodeId>,
    children: Vec<NodeId>,
    sent_seqnum: u64,
    processed_seqnum: u64,
    pending_term_acks: usize,
    phase: Phase,
    linger: Linger,
}

impl NodeState {
    fn new(owner: Option<NodeId>) -> Self {
        Self {
            owner,
            children: Vec::new(),
            sent_seqnum: 0,
            processed_seqnum: 0,
            pending_term_acks: 0,
            phase: Phase::Live,
            linger: Linger::Immediate,
        }
    }

    /// A node may be destroyed once it has no live children, every command
    /// it sent has been processed, and every term-ack it is waiting on has
    /// arrived.
    fn can_destroy(&self) -> bool {
        self.phase == Phase::Terminating
            && self.children.is_empty()
            && self.processed_seqnum == self.sent_seqnum
            && self.pending_term_acks == 0
    }
}

/// The ownership tree itself. A `Context` (or, in tests, any root) owns one
/// of these; every `launch_child`/`term_child` call goes through it so that
/// mutation of the tree is centralized and therefore trivially
/// single-writer even though nodes themselves may live on different I/O
/// threads.
#[derive(Default)]
pub struct Ownership {
    nodes: DashMap<NodeId, Mutex<NodeState>>,
}

impl Ownership {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new node, owned by `owner` (`None` only for the root).
    pub fn launch_child(&self, owner: Option<NodeId>) -> NodeId {
        let id = NodeId::next();
        self.nodes.insert(id, Mutex::new(NodeState::new(owner)));
        if let Some(owner) = owner {
            if let Some(parent) = self.nodes.get(&owner) {
                parent.lock().children.push(id);
            }
        }
        id
    }

    /// Begin terminating `id` with the given linger policy. Fans the
    /// request out to children first; `id` itself only becomes destroyable
    /// once every child has acked.
    pub fn term_child(&self, id: NodeId, linger: Linger) {
        let children = {
            let Some(entry) = self.nodes.get(&id) else {
                return;
            };
            let mut state = entry.lock();
            if state.phase != Phase::Live {
                return;
            }
            state.phase = Phase::Terminating;
            state.linger = linger;
            state.pending_term_acks = state.children.len();
            state.children.clone()
        };
        for child in children {
            self.term_child(child, linger);
        }
    }

    /// Record that a command this node sent has been processed by its
    /// recipient (the "processed_seqnum" half of the termination
    /// precondition).
    pub fn note_processed(&self, id: NodeId) {
        if let Some(entry) = self.nodes.get(&id) {
            entry.lock().processed_seqnum += 1;
        }
        self.reap(id);
    }

    /// Record that this node sent a command (the "sent_seqnum" half).
    pub fn note_sent(&self, id: NodeId) {
        if let Some(entry) = self.nodes.get(&id) {
            entry.lock().sent_seqnum += 1;
        }
    }

    /// A child has acked its own termination; clears it from `id`'s child
    /// set and decrements the pending-ack counter.
    pub fn note_child_terminated(&self, id: NodeId, child: NodeId) {
        if let Some(entry) = self.nodes.get(&id) {
            let mut state = entry.lock();
            state.children.retain(|c| *c != child);
            state.pending_term_acks = state.pending_term_acks.saturating_sub(1);
        }
        self.nodes.remove(&child);
        self.reap(id);
    }

    /// Destroy `id` if every termination precondition now holds, and
    /// propagate the ack to its owner.
    fn reap(&self, id: NodeId) {
        let (owner, should_destroy) = {
            let Some(entry) = self.nodes.get(&id) else {
                return;
            };
            let state = entry.lock();
            (state.owner, state.can_destroy())
        };
        if should_destroy {
            if let Some(entry) = self.nodes.get(&id) {
                entry.lock().phase = Phase::Terminated;
            }
            if let Some(owner) = owner {
                self.note_child_terminated(owner, id);
            } else {
                self.nodes.remove(&id);
            }
        }
    }

    #[must_use]
    pub fn is_terminated(&self, id: NodeId) -> bool {
        match self.nodes.get(&id) {
            Some(e) => e.lock().phase == Phase::Terminated,
            None => true,
        }
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_terminates_immediately() {
        let tree = Ownership::new();
        let root = tree.launch_child(None);
        let leaf = tree.launch_child(Some(root));
        tree.term_child(leaf, Linger::Immediate);
        assert!(tree.is_terminated(leaf));
    }

    #[test]
    fn parent_waits_for_child_ack() {
        let tree = Ownership::new();
        let root = tree.launch_child(None);
        let parent = tree.launch_child(Some(root));
        let child = tree.launch_child(Some(parent));

        tree.term_child(parent, Linger::Immediate);
        // child terminates on its own fan-out from term_child(parent, ..)
        assert!(tree.is_terminated(child));
        assert!(tree.is_terminated(parent));
    }

    #[test]
    fn seqnum_gate_blocks_destruction() {
        let tree = Ownership::new();
        let root = tree.launch_child(None);
        let node = tree.launch_child(Some(root));
        tree.note_sent(node);
        tree.term_child(node, Linger::Immediate);
        assert!(!tree.is_terminated(node));
        tree.note_processed(node);
        assert!(tree.is_terminated(node));
    }
}
