//! Admission bookkeeping and the sweep algorithm.
//!
//! [`SchedulerState`] is plain data driven by explicit instants; the
//! [`RequestScheduler`](super::RequestScheduler) wraps it in a mutex and
//! feeds it the clock. Keeping time out of this module lets the tests
//! replay exact schedules.
//!
//! Pacing works on two levels:
//!
//! - each scope has one timeline entry holding the earliest instant its
//!   next waiter may be granted
//! - a global cursor advances by one general interval per grant anywhere;
//!   nothing is granted while the cursor is ahead of the clock
//!
//! The cursor never lags the clock by more than the reset threshold, which
//! caps the burst an idle scheduler hands out at once.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::SchedulerSettings;

use super::bucket::Bucket;
use super::scope::ScopeKey;
use super::timeline::{Timeline, TimelineEntry};
use super::waiter::Waiter;

/// Bookkeeping for a scope that is not idle.
#[derive(Debug)]
enum ScopeState {
    /// A slot was granted synchronously; nobody is waiting.
    Reserved,
    /// At least one caller waits for the next slot.
    Queued(Bucket),
}

/// Result of trying to admit a caller.
#[derive(Debug)]
pub(crate) enum Enqueued {
    /// Proceed immediately.
    Granted,
    /// Wait on the returned handle.
    Queued(Arc<Waiter>),
    /// The scheduler has been stopped.
    Closed,
}

/// Summary of one sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SweepReport {
    /// Timeline entries popped.
    pub processed: usize,
    /// Waiters granted.
    pub granted: usize,
    /// Scopes that went back to idle.
    pub idled: usize,
    /// Stopped at the event limit with due entries left over.
    pub saturated: bool,
    /// The scheduler is closed; the sweeper should exit.
    pub closed: bool,
}

/// Point-in-time view of the scheduler's bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    /// Scopes that are reserved or have queued waiters.
    pub active_scopes: usize,
    /// Entries on the timeline.
    pub timeline_entries: usize,
    /// Waiters sitting in buckets, including cancelled ones not yet swept.
    pub queued_waiters: usize,
    /// Admissions granted without waiting.
    pub granted_immediately: u64,
    /// Admissions granted by the sweeper.
    pub granted_after_wait: u64,
    /// Whether the scheduler has been stopped.
    pub closed: bool,
}

/// All mutable scheduler state. Guarded by a single mutex in the facade.
#[derive(Debug)]
pub(crate) struct SchedulerState {
    timeline: Timeline,
    scopes: HashMap<ScopeKey, ScopeState>,
    /// Global pacing cursor.
    cursor: Instant,
    general_interval: Duration,
    reset_threshold: Duration,
    event_limit: usize,
    granted_immediately: u64,
    granted_after_wait: u64,
    closed: bool,
}

impl SchedulerState {
    pub(crate) fn new(settings: &SchedulerSettings, now: Instant) -> Self {
        let reset_threshold = settings.reset_threshold_duration();
        Self {
            timeline: Timeline::with_capacity(16),
            scopes: HashMap::with_capacity(16),
            cursor: now.checked_sub(reset_threshold).unwrap_or(now),
            general_interval: settings.general_interval(),
            reset_threshold,
            event_limit: settings.sweep_event_limit,
            granted_immediately: 0,
            granted_after_wait: 0,
            closed: false,
        }
    }

    /// Grant synchronously when the scope is idle and the cursor allows it,
    /// otherwise queue a waiter behind the scope's earlier callers.
    pub(crate) fn admit(&mut self, scope: ScopeKey, interval: Duration, now: Instant) -> Enqueued {
        if self.closed {
            return Enqueued::Closed;
        }

        let state = match self.scopes.entry(scope) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => {
                let fast = self.cursor < now;
                let eligible_at = if fast { now + interval } else { now };
                self.timeline.push(TimelineEntry {
                    scope,
                    eligible_at,
                    interval,
                });
                let state = vacant.insert(ScopeState::Reserved);
                if fast {
                    self.cursor += self.general_interval;
                    self.granted_immediately += 1;
                    return Enqueued::Granted;
                }
                state
            }
        };

        let waiter = Arc::new(Waiter::new());
        match state {
            ScopeState::Queued(bucket) => bucket.push(Arc::clone(&waiter)),
            ScopeState::Reserved => {
                let mut bucket = Bucket::default();
                bucket.push(Arc::clone(&waiter));
                *state = ScopeState::Queued(bucket);
            }
        }
        Enqueued::Queued(waiter)
    }

    /// Grant every waiter whose slot is due at `now`, bounded by the event
    /// limit.
    pub(crate) fn sweep(&mut self, now: Instant) -> SweepReport {
        let mut report = SweepReport::default();
        if self.closed {
            report.closed = true;
            return report;
        }

        if now.saturating_duration_since(self.cursor) > self.reset_threshold {
            if let Some(snapped) = now.checked_sub(self.reset_threshold) {
                self.cursor = snapped;
            }
        }

        while self.cursor < now {
            if report.processed == self.event_limit {
                report.saturated = self.timeline.peek().is_some_and(|e| e.eligible_at <= now);
                break;
            }
            let Some(entry) = self.timeline.pop_due(now) else {
                break;
            };
            report.processed += 1;

            let (granted, drained) = match self.scopes.get_mut(&entry.scope) {
                Some(ScopeState::Queued(bucket)) => {
                    let granted = bucket.grant_next();
                    (granted, bucket.len() == 0)
                }
                _ => (false, true),
            };

            if granted {
                if drained {
                    // Keep the slot reserved until it comes due again.
                    self.scopes.insert(entry.scope, ScopeState::Reserved);
                }
                self.timeline.push(entry.next(now));
                self.cursor += self.general_interval;
                self.granted_after_wait += 1;
                report.granted += 1;
            } else {
                self.scopes.remove(&entry.scope);
                report.idled += 1;
            }
        }
        report
    }

    /// Close the scheduler and cancel every queued waiter. Returns `None`
    /// when it was already closed, otherwise the number of waiters cancelled.
    pub(crate) fn close(&mut self) -> Option<usize> {
        if self.closed {
            return None;
        }
        self.closed = true;
        let cancelled = self
            .scopes
            .drain()
            .map(|(_, state)| match state {
                ScopeState::Queued(mut bucket) => bucket.cancel_all(),
                ScopeState::Reserved => 0,
            })
            .sum();
        self.timeline.clear();
        Some(cancelled)
    }

    pub(crate) const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Timeline entries plus active scopes; zero once all work drained.
    pub(crate) fn tracked_count(&self) -> usize {
        self.timeline.len() + self.scopes.len()
    }

    pub(crate) fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            active_scopes: self.scopes.len(),
            timeline_entries: self.timeline.len(),
            queued_waiters: self
                .scopes
                .values()
                .map(|s| match s {
                    ScopeState::Queued(bucket) => bucket.len(),
                    ScopeState::Reserved => 0,
                })
                .sum(),
            granted_immediately: self.granted_immediately,
            granted_after_wait: self.granted_after_wait,
            closed: self.closed,
        }
    }
}
