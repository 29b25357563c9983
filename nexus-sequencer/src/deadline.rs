//! Absolute deadlines attached to pending requests.

use std::time::{Duration, Instant};

use crate::clock::Clock;

/// An absolute instant after which a pending request must fail.
///
/// Computed once when the request is submitted and never recomputed, so time
/// spent waiting in the pending set counts against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Deadline(Instant);

impl Deadline {
    /// Wraps an absolute instant.
    #[inline]
    pub const fn at(instant: Instant) -> Self {
        Self(instant)
    }

    /// Resolves an optional relative timeout against `clock`.
    ///
    /// `None` means "block indefinitely". A timeout so large that the
    /// instant would overflow is treated the same way.
    pub fn from_timeout(clock: &dyn Clock, timeout: Option<Duration>) -> Option<Self> {
        let timeout = timeout?;
        clock.now().checked_add(timeout).map(Self)
    }

    /// Returns the underlying instant.
    #[inline]
    pub const fn instant(&self) -> Instant {
        self.0
    }

    /// Returns `true` once `now` has reached the deadline.
    #[inline]
    pub fn has_elapsed(&self, now: Instant) -> bool {
        now >= self.0
    }

    /// Time left until the deadline, saturating at zero.
    #[inline]
    pub fn remaining(&self, now: Instant) -> Duration {
        self.0.saturating_duration_since(now)
    }
}
