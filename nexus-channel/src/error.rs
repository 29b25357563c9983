use std::io;

use nexus_sequencer::SequencerError;
use thiserror::Error;

/// Errors returned by [`BoundedQueue`](crate::BoundedQueue) and its views.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Construction with a capacity below one.
    #[error("capacity must be at least 1, got {0}")]
    InvalidCapacity(usize),

    /// The put deadline elapsed while the queue stayed full.
    ///
    /// The value was not enqueued.
    #[error("timed out waiting for space")]
    PutTimeout,

    /// The take deadline elapsed while the queue stayed empty.
    ///
    /// Nothing was removed.
    #[error("timed out waiting for an item")]
    TakeTimeout,

    /// The queue was disposed before the operation completed.
    #[error("queue disposed")]
    Disposed,

    /// The queue's worker thread could not be started.
    #[error("failed to spawn queue thread: {0}")]
    Spawn(#[source] io::Error),
}

impl QueueError {
    /// Returns `true` for [`PutTimeout`](Self::PutTimeout) and
    /// [`TakeTimeout`](Self::TakeTimeout).
    pub fn is_timeout(&self) -> bool {
        matches!(self, QueueError::PutTimeout | QueueError::TakeTimeout)
    }

    /// Returns `true` if this error is the `Disposed` variant.
    pub fn is_disposed(&self) -> bool {
        matches!(self, QueueError::Disposed)
    }
}

impl From<SequencerError> for QueueError {
    fn from(err: SequencerError) -> Self {
        match err {
            SequencerError::Disposed => QueueError::Disposed,
            SequencerError::Spawn(err) => QueueError::Spawn(err),
        }
    }
}
