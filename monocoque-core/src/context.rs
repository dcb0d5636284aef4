//! The process-scoped root of the ownership tree.
//!
//! `Context` owns the I/O thread pool, the live-socket registry, and the
//! termination flag. There is one per process in typical use (mirroring
//! libzmq), though nothing here enforces a singleton — tests routinely
//! create several.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::info;

use crate::config::ContextOptions;
use crate::io_thread::IoThreadPool;
use crate::own::{Linger, NodeId, Ownership};

struct Inner {
    options: ContextOptions,
    io_threads: IoThreadPool,
    ownership: Ownership,
    root: NodeId,
    sockets: DashMap<NodeId, ()>,
    terminating: AtomicBool,
}

/// Cheaply clonable handle to the context; every clone shares the same
/// underlying pool and registry.
#[derive(Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(ContextOptions::default())
    }

    #[must_use]
    pub fn with_options(options: ContextOptions) -> Self {
        let ownership = Ownership::new();
        let root = ownership.launch_child(None);
        Self {
            inner: Arc::new(Inner {
                io_threads: IoThreadPool::new(options.io_threads),
                options,
                ownership,
                root,
                sockets: DashMap::new(),
                terminating: AtomicBool::new(false),
            }),
        }
    }

    #[must_use]
    pub fn options(&self) -> ContextOptions {
        self.inner.options
    }

    #[must_use]
    pub fn is_terminating(&self) -> bool {
        self.inner.terminating.load(Ordering::Acquire)
    }

    /// Register a new socket as a child of the context root. Returns
    /// `None` once the context has begun terminating (`ETERM` territory
    /// for the caller).
    #[must_use]
    pub fn register_socket(&self) -> Option<NodeId> {
        if self.is_terminating() {
            return None;
        }
        if self.inner.sockets.len() >= self.inner.options.max_sockets {
            return None;
        }
        let id = self.inner.ownership.launch_child(Some(self.inner.root));
        self.inner.sockets.insert(id, ());
        Some(id)
    }

    pub fn close_socket(&self, id: NodeId, linger: Linger) {
        self.inner.ownership.term_child(id, linger);
        self.inner.sockets.remove(&id);
    }

    #[must_use]
    pub fn io_thread_pool(&self) -> &IoThreadPool {
        &self.inner.io_threads
    }

    #[must_use]
    pub fn ownership(&self) -> &Ownership {
        &self.inner.ownership
    }

    /// Begin process-wide termination: marks the context as terminating
    /// (so further `register_socket` calls fail with the equivalent of
    /// `ETERM`), tears down every remaining socket with the context's
    /// linger, and interrupts every I/O thread's poll loop immediately —
    /// this is what lets a device blocked on poll with no ready socket
    /// still observe termination and exit.
    pub fn terminate(&self, linger: Linger) {
        if self.inner.terminating.swap(true, Ordering::AcqRel) {
            return; // double-terminate is a no-op
        }
        info!(sockets = self.inner.sockets.len(), "context terminating");
        for entry in self.inner.sockets.iter() {
            self.inner.ownership.term_child(*entry.key(), linger);
        }
        self.inner.io_threads.terminate_all();
    }

    #[must_use]
    pub fn live_sockets(&self) -> usize {
        self.inner.sockets.len()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_fails_after_terminate() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let ctx = Context::new();
            ctx.terminate(Linger::Immediate);
            assert!(ctx.register_socket().is_none());
        });
    }

    #[test]
    fn double_terminate_is_noop() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let ctx = Context::new();
            ctx.terminate(Linger::Immediate);
            ctx.terminate(Linger::Immediate); // must not panic
            assert!(ctx.is_terminating());
        });
    }

    #[test]
    fn max_sockets_enforced() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let mut opts = ContextOptions::default();
            opts.max_sockets = 1;
            let ctx = Context::with_options(opts);
            assert!(ctx.register_socket().is_some());
            assert!(ctx.register_socket().is_none());
        });
    }
}
