//! Caller-driven cancellation signal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::waiter::{Admission, Waiter};

/// Registrations below this length are never pruned.
const MIN_PRUNE_LEN: usize = 16;

#[derive(Debug, Default)]
struct CancelInner {
    cancelled: AtomicBool,
    registry: Mutex<Registry>,
}

/// Weak handles to waiters, pruned once the list doubles since the last
/// prune so registration stays amortized O(1).
#[derive(Debug, Default)]
struct Registry {
    waiters: Vec<Weak<Waiter>>,
    prune_at: usize,
}

impl Registry {
    fn push(&mut self, waiter: &Arc<Waiter>) {
        if self.waiters.len() >= self.prune_at.max(MIN_PRUNE_LEN) {
            self.waiters
                .retain(|w| w.upgrade().is_some_and(|w| !w.is_resolved()));
            self.prune_at = self.waiters.len() * 2;
        }
        self.waiters.push(Arc::downgrade(waiter));
    }
}

/// Cooperative cancellation signal passed to admission calls.
///
/// Cloning shares the signal. Cancelling resolves every admission still
/// waiting under this token as cancelled and makes later admissions with
/// it fail immediately.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

impl CancelToken {
    /// Create a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger cancellation. Idempotent.
    pub fn cancel(&self) {
        let waiters = {
            let mut registry = self.inner.registry.lock();
            if self.inner.cancelled.swap(true, Ordering::AcqRel) {
                return;
            }
            std::mem::take(&mut *registry).waiters
        };
        for waiter in waiters.iter().filter_map(Weak::upgrade) {
            waiter.try_resolve(Admission::Cancelled);
        }
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Attach a queued waiter. Returns `false` when the token was already
    /// cancelled; the caller must then resolve the waiter itself.
    pub(crate) fn register(&self, waiter: &Arc<Waiter>) -> bool {
        let mut registry = self.inner.registry.lock();
        if self.inner.cancelled.load(Ordering::Acquire) {
            return false;
        }
        registry.push(waiter);
        true
    }
}
