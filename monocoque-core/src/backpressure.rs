//! Backpressure: `BytePermits`
//!
//! Byte-based flow control for write pumps.
//!
//! Design principle:
//! - Backpressure scales with **bytes**, not message count
//! - One giant message should not starve other connections
//! - Pluggable: `NoOp` (default) → Semaphore → dynamic policy
//!
//! Usage:
//! ```rust,ignore
//! let permit = permits.acquire(n_bytes).await;
//! writer.write(buf).await;
//! drop(permit); // releases automatically
//! ```

use async_trait::async_trait;

/// Backpressure permit trait.
///
/// Implementations control write pump flow based on byte counts.
#[async_trait]
pub trait BytePermits: Send + Sync {
    /// Acquire permission to write `n_bytes`.
    ///
    /// This may block if the system is under memory pressure.
    async fn acquire(&self, n_bytes: usize) -> Permit;
}

/// RAII permit guard.
///
/// Releases the permit when dropped. `NoOpPermits` returns an empty one;
/// `SemaphorePermits` stashes the acquired semaphore guards here so they
/// release back to the pool when the caller drops the permit.
pub struct Permit {
    _guards: Vec<async_lock::SemaphoreGuardArc>,
}

impl Permit {
    pub(crate) const fn new() -> Self {
        Self { _guards: Vec::new() }
    }

    pub(crate) fn held(guards: Vec<async_lock::SemaphoreGuardArc>) -> Self {
        Self { _guards: guards }
    }
}

/// No-op implementation.
///
/// Always grants permits immediately. Useful for sockets whose HWM is
/// already enforced at the message level by their `PipeEnd` (every pattern
/// socket in this crate) and that don't need a second, byte-granular gate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpPermits;

#[async_trait]
impl BytePermits for NoOpPermits {
    async fn acquire(&self, _n_bytes: usize) -> Permit {
        Permit::new()
    }
}

/// Byte-budgeted permits backed by a counting semaphore.
///
/// `n_bytes` is rounded up to the nearest `unit_size` and that many
/// semaphore units are acquired; the permit releases them back on drop.
/// This is deliberately coarser-grained than tracking exact byte counts —
/// `async_lock::Semaphore` only deals in whole units — but keeps one giant
/// write from starving smaller concurrent ones, which is the property this
/// module exists for.
pub struct SemaphorePermits {
    semaphore: std::sync::Arc<async_lock::Semaphore>,
    unit_size: usize,
}

impl SemaphorePermits {
    /// `budget_bytes` total outstanding bytes allowed across all holders;
    /// `unit_size` is the granularity permits are acquired/released in.
    #[must_use]
    pub fn new(budget_bytes: usize, unit_size: usize) -> Self {
        let unit_size = unit_size.max(1);
        let units = (budget_bytes / unit_size).max(1);
        Self {
            semaphore: std::sync::Arc::new(async_lock::Semaphore::new(units)),
            unit_size,
        }
    }

    fn units_for(&self, n_bytes: usize) -> u32 {
        (n_bytes.div_ceil(self.unit_size)).max(1) as u32
    }
}

#[async_trait]
impl BytePermits for SemaphorePermits {
    async fn acquire(&self, n_bytes: usize) -> Permit {
        let units = self.units_for(n_bytes);
        let mut guards = Vec::with_capacity(units as usize);
        for _ in 0..units {
            guards.push(self.semaphore.clone().acquire_arc().await);
        }
        Permit::held(guards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_permits_always_succeed() {
        let permits = NoOpPermits;
        let rt = compio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let _p1 = permits.acquire(1024).await;
            let _p2 = permits.acquire(1_000_000).await;
        });
    }

    #[test]
    fn semaphore_permits_round_to_units_and_release_on_drop() {
        let permits = SemaphorePermits::new(1024, 256);
        let rt = compio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let p1 = permits.acquire(300).await; // 2 units
            let p2 = permits.acquire(256).await; // 1 unit
            drop(p1);
            let p3 = permits.acquire(512).await; // 2 units, fits after release
            drop((p2, p3));
        });
    }
}
