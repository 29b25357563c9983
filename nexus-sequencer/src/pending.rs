//! The ordered set of requests waiting on a sequencer.

use std::collections::VecDeque;
use std::time::Instant;

use crate::deadline::Deadline;

/// A submitted request and the deadline fixed when it was submitted.
#[derive(Debug)]
pub(crate) struct Pending<R> {
    pub(crate) ticket: u64,
    pub(crate) request: R,
    pub(crate) deadline: Option<Deadline>,
}

/// Pending requests in arrival order.
///
/// Tracks how many entries carry a deadline and caches the earliest one, so
/// a step only scans for expired entries once something has actually
/// expired. The cache is invalidated when its entry leaves and rebuilt on the
/// next query.
pub(crate) struct PendingSet<R> {
    entries: VecDeque<Pending<R>>,
    timed: usize,
    earliest: Option<Deadline>,
    stale: bool,
}

impl<R> PendingSet<R> {
    pub(crate) fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            timed: 0,
            earliest: None,
            stale: false,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn push(&mut self, pending: Pending<R>) {
        if let Some(deadline) = pending.deadline {
            if self.timed == 0 {
                self.earliest = Some(deadline);
                self.stale = false;
            } else if !self.stale {
                self.earliest = Some(self.earliest.map_or(deadline, |e| e.min(deadline)));
            }
            self.timed += 1;
        }
        self.entries.push_back(pending);
    }

    /// Removes the earliest-arrived request whose deadline has elapsed.
    pub(crate) fn take_expired(&mut self, now: Instant) -> Option<Pending<R>> {
        if !self.next_deadline()?.has_elapsed(now) {
            return None;
        }
        let index = self
            .entries
            .iter()
            .position(|p| p.deadline.is_some_and(|d| d.has_elapsed(now)))?;
        self.remove(index)
    }

    /// Removes the earliest-arrived request matching `admits`.
    pub(crate) fn take_first<F>(&mut self, mut admits: F) -> Option<Pending<R>>
    where
        F: FnMut(&R) -> bool,
    {
        let index = self.entries.iter().position(|p| admits(&p.request))?;
        self.remove(index)
    }

    /// Earliest deadline among pending requests.
    pub(crate) fn next_deadline(&mut self) -> Option<Deadline> {
        if self.timed == 0 {
            return None;
        }
        if self.stale {
            self.earliest = self.entries.iter().filter_map(|p| p.deadline).min();
            self.stale = false;
        }
        self.earliest
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = Pending<R>> + '_ {
        self.timed = 0;
        self.earliest = None;
        self.stale = false;
        self.entries.drain(..)
    }

    fn remove(&mut self, index: usize) -> Option<Pending<R>> {
        let pending = self.entries.remove(index)?;
        if let Some(deadline) = pending.deadline {
            self.timed -= 1;
            if self.earliest == Some(deadline) {
                self.stale = true;
            }
        }
        Some(pending)
    }
}
