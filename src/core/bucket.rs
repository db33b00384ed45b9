//! Per-scope FIFO of waiters.

use std::collections::VecDeque;
use std::sync::Arc;

use super::waiter::{Admission, Waiter};

/// Waiters queued for one scope, oldest first.
///
/// The first waiter lives in a dedicated slot so the common case of a
/// single outstanding caller never allocates the overflow queue.
#[derive(Debug, Default)]
pub(crate) struct Bucket {
    head: Option<Arc<Waiter>>,
    overflow: VecDeque<Arc<Waiter>>,
}

impl Bucket {
    pub(crate) fn push(&mut self, waiter: Arc<Waiter>) {
        if self.head.is_none() && self.overflow.is_empty() {
            self.head = Some(waiter);
        } else {
            self.overflow.push_back(waiter);
        }
    }

    /// Grant the oldest waiter that has not been cancelled.
    ///
    /// Cancelled waiters in front of it are discarded. Returns `false` when
    /// the bucket ran dry without granting anyone.
    pub(crate) fn grant_next(&mut self) -> bool {
        if let Some(waiter) = self.head.take() {
            if waiter.try_resolve(Admission::Granted) {
                return true;
            }
        }
        while let Some(waiter) = self.overflow.pop_front() {
            if waiter.try_resolve(Admission::Granted) {
                return true;
            }
        }
        false
    }

    /// Resolve every queued waiter as cancelled. Returns how many were
    /// still pending.
    pub(crate) fn cancel_all(&mut self) -> usize {
        self.head
            .take()
            .into_iter()
            .chain(self.overflow.drain(..))
            .filter(|w| w.try_resolve(Admission::Cancelled))
            .count()
    }

    pub(crate) fn len(&self) -> usize {
        usize::from(self.head.is_some()) + self.overflow.len()
    }
}
