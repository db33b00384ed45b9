//! Single-assignment completion handle for a suspended caller.
//!
//! A [`Waiter`] is shared between the bucket that queues it, the caller
//! that waits on it and the cancel token it is registered with. Whoever
//! resolves it first wins; later attempts are no-ops.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Condvar, Mutex};

/// Final state of an admission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admission {
    /// The caller may proceed.
    Granted,
    /// The caller or a shutdown abandoned the request.
    Cancelled,
}

/// Suspended caller awaiting admission.
pub(crate) struct Waiter {
    /// Guards against double resolution.
    resolved: AtomicBool,
    outcome: Mutex<Option<Admission>>,
    /// Wakes blocking waiters.
    condvar: Condvar,
    /// Wakes async waiters.
    #[cfg(feature = "tokio-runtime")]
    notify: tokio::sync::Notify,
}

impl Waiter {
    pub(crate) fn new() -> Self {
        Self {
            resolved: AtomicBool::new(false),
            outcome: Mutex::new(None),
            condvar: Condvar::new(),
            #[cfg(feature = "tokio-runtime")]
            notify: tokio::sync::Notify::new(),
        }
    }

    /// Resolve the waiter. Returns `false` if it had already been resolved.
    ///
    /// Only stores the outcome and signals; never runs caller code, so it
    /// is safe to call while holding the scheduler lock.
    pub(crate) fn try_resolve(&self, outcome: Admission) -> bool {
        if self.resolved.swap(true, Ordering::AcqRel) {
            return false;
        }
        *self.outcome.lock() = Some(outcome);
        self.condvar.notify_all();
        #[cfg(feature = "tokio-runtime")]
        self.notify.notify_one();
        true
    }

    pub(crate) fn is_resolved(&self) -> bool {
        self.resolved.load(Ordering::Acquire)
    }

    pub(crate) fn outcome(&self) -> Option<Admission> {
        *self.outcome.lock()
    }

    /// Block the current thread until resolved.
    pub(crate) fn wait_blocking(&self) -> Admission {
        let mut outcome = self.outcome.lock();
        loop {
            if let Some(o) = *outcome {
                return o;
            }
            self.condvar.wait(&mut outcome);
        }
    }

    /// Suspend the current task until resolved.
    #[cfg(feature = "tokio-runtime")]
    pub(crate) async fn wait(&self) -> Admission {
        loop {
            let notified = self.notify.notified();
            if let Some(o) = self.outcome() {
                return o;
            }
            notified.await;
        }
    }
}

impl std::fmt::Debug for Waiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Waiter")
            .field("outcome", &self.outcome())
            .finish_non_exhaustive()
    }
}
