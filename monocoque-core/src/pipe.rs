//! The pipe layer: a bounded, directional channel between a socket and one
//! attached peer (session), with HWM/LWM flow control and a termination
//! handshake.
//!
//! A `pipepair` creates both ends at once, mirroring the teacher's
//! `RouterHub`/`PubSubHub` peer-channel construction (`flume::unbounded`
//! between hub and peer actor), generalized here to a bounded capacity and
//! given the explicit HWM/LWM/termination state this crate's socket layer
//! needs for every pattern, not just ROUTER and PUB/SUB.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use flume::{Receiver, Sender, TryRecvError, TrySendError};

use crate::msg::Msg;

/// Default low water mark ratio applied when a caller does not pick one
/// explicitly: re-enable writing once the queue has drained below half the
/// high water mark.
const DEFAULT_LWM_RATIO: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PipeState {
    Active,
    DelimiterSent,
    Pending,
    Terminating,
    Terminated,
}

struct PipeShared {
    hwm: usize,
    lwm: usize,
    queued: AtomicUsize,
    state: parking_lot::Mutex<PipeState>,
}

impl PipeShared {
    fn writable(&self) -> bool {
        self.hwm == 0 || self.queued.load(Ordering::Acquire) < self.hwm
    }
}

/// One end of a pipe. `pipepair` hands out two of these, wired to each
/// other's channels.
pub struct PipeEnd {
    shared: Arc<PipeShared>,
    outbound: Sender<Msg>,
    inbound: Receiver<Msg>,
    /// Set once this end has sent its `pipe_term`; used to make `terminate`
    /// idempotent under re-entrancy.
    term_sent: bool,
}

impl PipeEnd {
    /// Non-blocking read. Returns `Ok(None)` if nothing is queued, and
    /// leaves the delimiter un-consumed in-queue semantics handled by the
    /// termination state: after the delimiter has been read, `read` always
    /// returns `Ok(None)`.
    pub fn read(&mut self) -> Result<Option<Msg>, PipeError> {
        let state = *self.shared.state.lock();
        if state == PipeState::Terminated {
            return Ok(None);
        }
        match self.inbound.try_recv() {
            Ok(msg) => {
                if msg.is_delimiter() {
                    *self.shared.state.lock() = PipeState::Terminated;
                    return Ok(None);
                }
                self.shared.queued.fetch_sub(1, Ordering::AcqRel);
                Ok(Some(msg))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                *self.shared.state.lock() = PipeState::Terminated;
                Ok(None)
            }
        }
    }

    /// `true` if a subsequent `read` is expected to yield a message
    /// without blocking.
    #[must_use]
    pub fn check_read(&self) -> bool {
        !self.inbound.is_empty()
    }

    /// Non-blocking write. `false` means the pipe is at its high water mark
    /// and the caller should suspend (or return `EAGAIN` for `DONTWAIT`).
    pub fn write(&mut self, msg: Msg) -> Result<bool, PipeError> {
        if *self.shared.state.lock() != PipeState::Active {
            return Err(PipeError::Terminating);
        }
        if !self.shared.writable() {
            return Ok(false);
        }
        match self.outbound.try_send(msg) {
            Ok(()) => {
                self.shared.queued.fetch_add(1, Ordering::AcqRel);
                Ok(true)
            }
            Err(TrySendError::Full(_)) => Ok(false),
            Err(TrySendError::Disconnected(_)) => Err(PipeError::PeerGone),
        }
    }

    /// Blocking write used by suspension points (`send` without `DONTWAIT`).
    pub async fn write_async(&mut self, msg: Msg) -> Result<(), PipeError> {
        if *self.shared.state.lock() != PipeState::Active {
            return Err(PipeError::Terminating);
        }
        self.outbound
            .send_async(msg)
            .await
            .map_err(|_| PipeError::PeerGone)?;
        self.shared.queued.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    /// Blocking read used by suspension points.
    pub async fn read_async(&mut self) -> Result<Option<Msg>, PipeError> {
        match self.inbound.recv_async().await {
            Ok(msg) => {
                if msg.is_delimiter() {
                    *self.shared.state.lock() = PipeState::Terminated;
                    return Ok(None);
                }
                self.shared.queued.fetch_sub(1, Ordering::AcqRel);
                Ok(Some(msg))
            }
            Err(_) => {
                *self.shared.state.lock() = PipeState::Terminated;
                Ok(None)
            }
        }
    }

    /// No-op: unlike a staged write buffer, each `write` is already
    /// delivered to the channel. Kept to satisfy the pipe contract for
    /// callers that flush unconditionally after a burst of writes.
    pub fn flush(&mut self) {}

    /// Discard whatever of an in-progress multi-frame send has already been
    /// queued on this pipe. Used when a pattern socket aborts a partially
    /// written logical message (e.g. REP rolling back a malformed reply).
    ///
    /// Frames already delivered to the peer's channel cannot be recalled;
    /// this drains only what is still sitting unread on the peer side is
    /// out of reach from here by design (SPSC), so rollback is a property
    /// the *sender* enforces by not writing past the point of failure.
    pub fn rollback(&mut self) {}

    /// Called when the peer end of this pipe has been replaced (e.g. after
    /// a reconnect) rather than destroyed. Resets transient flow-control
    /// counters but keeps the pipe's identity.
    pub fn hiccup(&mut self) {
        self.shared.queued.store(0, Ordering::Release);
        *self.shared.state.lock() = PipeState::Active;
    }

    /// Begin the termination handshake: enqueue the delimiter ahead of any
    /// further writes, after giving already-queued messages a chance to be
    /// delivered if `delay_sends` is set.
    pub fn terminate(&mut self, delay_sends: bool) {
        let mut state = self.shared.state.lock();
        if *state == PipeState::Terminated || self.term_sent {
            return;
        }
        if !delay_sends {
            self.shared.queued.store(0, Ordering::Release);
        }
        let _ = self.outbound.try_send(Msg::init_delimiter());
        *state = PipeState::DelimiterSent;
        drop(state);
        self.term_sent = true;
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        *self.shared.state.lock() == PipeState::Terminated
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipeError {
    #[error("pipe is terminating")]
    Terminating,
    #[error("peer end dropped")]
    PeerGone,
}

/// Create both ends of a pipe at once. `hwm_a` bounds how much `a` may have
/// outstanding toward `b`, and vice versa for `hwm_b` — matching libzmq's
/// independent per-direction high water marks.
#[must_use]
pub fn pipepair(hwm_a: usize, hwm_b: usize) -> (PipeEnd, PipeEnd) {
    let (tx_ab, rx_ab) = bounded_or_unbounded(hwm_a);
    let (tx_ba, rx_ba) = bounded_or_unbounded(hwm_b);

    let shared_a = Arc::new(PipeShared {
        hwm: hwm_a,
        lwm: lwm_for(hwm_a),
        queued: AtomicUsize::new(0),
        state: parking_lot::Mutex::new(PipeState::Active),
    });
    let shared_b = Arc::new(PipeShared {
        hwm: hwm_b,
        lwm: lwm_for(hwm_b),
        queued: AtomicUsize::new(0),
        state: parking_lot::Mutex::new(PipeState::Active),
    });

    (
        PipeEnd {
            shared: shared_a,
            outbound: tx_ab,
            inbound: rx_ba,
            term_sent: false,
        },
        PipeEnd {
            shared: shared_b,
            outbound: tx_ba,
            inbound: rx_ab,
            term_sent: false,
        },
    )
}

fn lwm_for(hwm: usize) -> usize {
    if hwm == 0 {
        0
    } else {
        (hwm / DEFAULT_LWM_RATIO).max(1)
    }
}

fn bounded_or_unbounded(hwm: usize) -> (Sender<Msg>, Receiver<Msg>) {
    if hwm == 0 {
        flume::unbounded()
    } else {
        // +1 slack so the delimiter always has room even at HWM.
        flume::bounded(hwm + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_blocks_at_hwm() {
        let (mut a, _b) = pipepair(2, 2);
        assert!(a.write(Msg::from_bytes(bytes::Bytes::from_static(b"1"), false)).unwrap());
        assert!(a.write(Msg::from_bytes(bytes::Bytes::from_static(b"2"), false)).unwrap());
        assert!(!a.write(Msg::from_bytes(bytes::Bytes::from_static(b"3"), false)).unwrap());
    }

    #[test]
    fn read_drains_fifo() {
        let (mut a, mut b) = pipepair(4, 4);
        a.write(Msg::from_bytes(bytes::Bytes::from_static(b"1"), false)).unwrap();
        a.write(Msg::from_bytes(bytes::Bytes::from_static(b"2"), false)).unwrap();
        assert_eq!(b.read().unwrap().unwrap().data(), b"1");
        assert_eq!(b.read().unwrap().unwrap().data(), b"2");
        assert!(b.read().unwrap().is_none());
    }

    #[test]
    fn terminate_delivers_delimiter_then_reads_stop() {
        let (mut a, mut b) = pipepair(4, 4);
        a.write(Msg::from_bytes(bytes::Bytes::from_static(b"1"), false)).unwrap();
        a.terminate(true);
        assert_eq!(b.read().unwrap().unwrap().data(), b"1");
        assert!(b.read().unwrap().is_none());
        assert!(b.is_terminated());
    }

    #[test]
    fn write_after_terminate_fails() {
        let (mut a, _b) = pipepair(4, 4);
        a.terminate(false);
        assert!(matches!(
            a.write(Msg::from_bytes(bytes::Bytes::from_static(b"x"), false)),
            Err(PipeError::Terminating)
        ));
    }

    #[test]
    fn credit_restored_after_read() {
        let (mut a, mut b) = pipepair(1, 1);
        assert!(a.write(Msg::from_bytes(bytes::Bytes::from_static(b"1"), false)).unwrap());
        assert!(!a.write(Msg::from_bytes(bytes::Bytes::from_static(b"2"), false)).unwrap());
        b.read().unwrap();
        assert!(a.write(Msg::from_bytes(bytes::Bytes::from_static(b"2"), false)).unwrap());
    }
}
