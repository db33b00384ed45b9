//! Min-heap of per-scope next-eligible times.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use super::scope::ScopeKey;

/// When a scope may next be granted, and how far each grant pushes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TimelineEntry {
    pub scope: ScopeKey,
    pub eligible_at: Instant,
    pub interval: Duration,
}

impl TimelineEntry {
    /// The entry for the slot following a grant at `now`.
    pub(crate) fn next(self, now: Instant) -> Self {
        Self {
            eligible_at: now + self.interval,
            ..self
        }
    }
}

/// Heap element ordered by eligibility, then insertion sequence.
#[derive(Debug)]
struct Slot {
    entry: TimelineEntry,
    seq: u64,
}

impl PartialEq for Slot {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Slot {}

impl PartialOrd for Slot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Slot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.entry
            .eligible_at
            .cmp(&other.entry.eligible_at)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Earliest-first ordering of scope slots. Ties pop in insertion order.
#[derive(Debug, Default)]
pub(crate) struct Timeline {
    heap: BinaryHeap<Reverse<Slot>>,
    next_seq: u64,
}

impl Timeline {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
            next_seq: 0,
        }
    }

    pub(crate) fn push(&mut self, entry: TimelineEntry) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.heap.push(Reverse(Slot { entry, seq }));
    }

    pub(crate) fn peek(&self) -> Option<&TimelineEntry> {
        self.heap.peek().map(|Reverse(slot)| &slot.entry)
    }

    /// Pop the earliest entry if it is due at `now`.
    pub(crate) fn pop_due(&mut self, now: Instant) -> Option<TimelineEntry> {
        if self.peek()?.eligible_at > now {
            return None;
        }
        self.heap.pop().map(|Reverse(slot)| slot.entry)
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    pub(crate) fn clear(&mut self) {
        self.heap.clear();
    }
}
