//! Tickless timer poller.
//!
//! `compio`'s io_uring runtime already multiplexes socket readiness per
//! operation, so unlike a classic epoll-based reactor this poller's only
//! job is the timer half of the reactor loop described in the spec: a
//! lazily-rebuilt list of scheduled callbacks, fired in a single pass each
//! time the I/O thread wakes, with the next wakeup computed as the nearest
//! deadline rather than a fixed tick.
//!
//! Used for reconnection backoff (`ReconnectState`), handshake timeouts,
//! and `RCVTIMEO`/`SNDTIMEO`.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

/// Opaque handle to a scheduled timer, returned by `add_timer` so the
/// caller can `remove_timer` it later (e.g. a reconnect attempt that
/// succeeded before its backoff timer fired).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

struct Timer {
    id: TimerId,
    deadline: Instant,
    interval: Option<Duration>,
}

/// Ordered by deadline, soonest first, via `Reverse` so `BinaryHeap` (a
/// max-heap) behaves as a min-heap.
struct Entry(Reverse<Instant>, Timer);

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for Entry {}
impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

/// Default poll timeout applied when no timer is scheduled: long enough to
/// avoid needless wakeups, short enough that a stuck mailbox drain is
/// bounded.
pub const BASE_POLL_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Default)]
pub struct Poller {
    timers: BinaryHeap<Entry>,
    next_id: u64,
    /// Ids removed since the last rebuild; lazily filtered out of the heap
    /// on the next pop rather than searched for eagerly, mirroring the
    /// "drain accumulated remove_timer requests" step of the main loop.
    removed: hashbrown::HashSet<TimerId>,
}

impl Poller {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a one-shot timer firing after `delay`.
    pub fn add_timer(&mut self, delay: Duration) -> TimerId {
        self.add_timer_at(Instant::now() + delay, None)
    }

    /// Schedule a timer that reschedules itself to `now + interval` each
    /// time it fires, matching the "enabled callback reschedules" rule.
    pub fn add_repeating_timer(&mut self, interval: Duration) -> TimerId {
        self.add_timer_at(Instant::now() + interval, Some(interval))
    }

    fn add_timer_at(&mut self, deadline: Instant, interval: Option<Duration>) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.timers.push(Entry(
            Reverse(deadline),
            Timer {
                id,
                deadline,
                interval,
            },
        ));
        id
    }

    pub fn remove_timer(&mut self, id: TimerId) {
        self.removed.insert(id);
    }

    /// Deadline for the next `poll`/`sleep` call: the nearer of the next
    /// timer firing or the base timeout, never blocking past either.
    #[must_use]
    pub fn next_deadline(&self) -> Duration {
        let now = Instant::now();
        match self.timers.peek() {
            Some(Entry(Reverse(deadline), _)) => deadline.saturating_duration_since(now).min(BASE_POLL_TIMEOUT),
            None => BASE_POLL_TIMEOUT,
        }
    }

    /// Pop and return every timer whose deadline has passed, rescheduling
    /// repeating ones. Called once per reactor iteration.
    pub fn fire_expired(&mut self) -> Vec<TimerId> {
        let now = Instant::now();
        let mut fired = Vec::new();
        while let Some(Entry(Reverse(deadline), _)) = self.timers.peek() {
            if *deadline > now {
                break;
            }
            let Entry(_, timer) = self.timers.pop().expect("peeked");
            if self.removed.remove(&timer.id) {
                continue;
            }
            fired.push(timer.id);
            if let Some(interval) = timer.interval {
                self.timers.push(Entry(
                    Reverse(now + interval),
                    Timer {
                        id: timer.id,
                        deadline: now + interval,
                        interval: Some(interval),
                    },
                ));
            }
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_timers_fire_in_deadline_order() {
        let mut poller = Poller::new();
        let far = poller.add_timer(Duration::from_secs(10));
        let near = poller.add_timer(Duration::from_millis(0));
        std::thread::sleep(Duration::from_millis(1));
        let fired = poller.fire_expired();
        assert_eq!(fired, vec![near]);
        assert_ne!(fired[0], far);
    }

    #[test]
    fn removed_timer_does_not_fire() {
        let mut poller = Poller::new();
        let id = poller.add_timer(Duration::from_millis(0));
        poller.remove_timer(id);
        std::thread::sleep(Duration::from_millis(1));
        assert!(poller.fire_expired().is_empty());
    }

    #[test]
    fn next_deadline_bounded_by_base_timeout() {
        let poller = Poller::new();
        assert_eq!(poller.next_deadline(), BASE_POLL_TIMEOUT);
    }
}
