//! Cross-thread command mailbox.
//!
//! Every control action that crosses a thread boundary — bind, connect,
//! close, term, an activate-write wakeup — is posted as a [`Command`]
//! through a `Mailbox` rather than by mutating shared socket state
//! directly. This is the same `flume` channel idiom the teacher already
//! uses for `RouterHub`/`PubSubHub` event plumbing, lifted to a named,
//! reusable type instead of an ad hoc channel pair per hub.

use flume::{Receiver, Sender};

use crate::own::{Linger, NodeId};
use crate::pipe::PipeEnd;

/// Commands flowing through a mailbox. `Custom` lets a pattern socket or
/// device carry its own payload through the same plumbing without the core
/// crate knowing about every socket type.
pub enum Command {
    /// Register `child` as owned by `parent`.
    Plug { parent: NodeId, child: NodeId },
    /// Begin terminating `target` with the given linger.
    Term { target: NodeId, linger: Linger },
    /// `target` has finished terminating; ack to its owner.
    TermAck { target: NodeId },
    /// A new pipe end has been attached to a socket-side node.
    AttachPipe { owner: NodeId, pipe: PipeEnd },
    /// Wake a socket because one of its pipes became writable again.
    ActivateWrite { target: NodeId },
    /// Wake a socket because one of its pipes has data to read.
    ActivateRead { target: NodeId },
}

/// A mailbox is just a named `flume` channel pair; kept as a type so
/// call sites read as "post a command" rather than "send on some channel".
#[derive(Clone)]
pub struct Mailbox {
    tx: Sender<Command>,
    rx: Receiver<Command>,
}

impl Mailbox {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self { tx, rx }
    }

    #[must_use]
    pub fn sender(&self) -> MailboxSender {
        MailboxSender(self.tx.clone())
    }

    /// Non-blocking drain of everything currently queued. Used by the
    /// poller's per-iteration mailbox check (step 6 of its main loop).
    pub fn drain(&self) -> Vec<Command> {
        self.rx.try_iter().collect()
    }

    pub async fn recv_async(&self) -> Option<Command> {
        self.rx.recv_async().await.ok()
    }
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

/// The sending half, cloned out to whoever needs to post commands into a
/// mailbox owned elsewhere (typically a different thread).
#[derive(Clone)]
pub struct MailboxSender(Sender<Command>);

impl MailboxSender {
    pub fn post(&self, cmd: Command) {
        let _ = self.0.send(cmd);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_returns_everything_queued() {
        let mailbox = Mailbox::new();
        let sender = mailbox.sender();
        let root = NodeId::next();
        let child = NodeId::next();
        sender.post(Command::Plug { parent: root, child });
        sender.post(Command::TermAck { target: child });
        assert_eq!(mailbox.drain().len(), 2);
        assert!(mailbox.drain().is_empty());
    }
}
