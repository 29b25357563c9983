//! Capability traits for the two sides of a queue.

use std::time::Duration;

use nexus_sequencer::InstanceId;

use crate::error::QueueError;
use crate::iter::Iter;

/// What every side of a queue can report about itself.
pub trait Endpoint {
    /// Identity of this handle. Views have their own.
    fn id(&self) -> InstanceId;

    /// Maximum number of buffered items. Never blocks.
    fn capacity(&self) -> usize;

    /// Current number of buffered items.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Disposed`] if the queue has been torn down.
    fn count(&self) -> Result<usize, QueueError>;
}

/// The producer side: enqueue with backpressure.
pub trait Enqueue<T>: Endpoint {
    /// Enqueues `value`, blocking while the queue is full.
    ///
    /// With `Some(timeout)`, fails with [`QueueError::PutTimeout`] if the
    /// value is not accepted before `now + timeout`; the value is then not
    /// enqueued.
    ///
    /// # Errors
    ///
    /// [`QueueError::PutTimeout`] or [`QueueError::Disposed`].
    fn put_with(&self, timeout: Option<Duration>, value: T) -> Result<(), QueueError>;

    /// Enqueues `value`, blocking indefinitely while the queue is full.
    ///
    /// # Errors
    ///
    /// [`QueueError::Disposed`].
    fn put(&self, value: T) -> Result<(), QueueError> {
        self.put_with(None, value)
    }

    /// Enqueues `value`, giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// [`QueueError::PutTimeout`] or [`QueueError::Disposed`].
    fn put_timeout(&self, value: T, timeout: Duration) -> Result<(), QueueError> {
        self.put_with(Some(timeout), value)
    }
}

/// The consumer side: dequeue in acceptance order.
pub trait Dequeue<T>: Endpoint {
    /// Removes the oldest item, blocking while the queue is empty.
    ///
    /// With `Some(timeout)`, fails with [`QueueError::TakeTimeout`] if no
    /// item arrives before `now + timeout`; nothing is removed.
    ///
    /// # Errors
    ///
    /// [`QueueError::TakeTimeout`] or [`QueueError::Disposed`].
    fn take_with(&self, timeout: Option<Duration>) -> Result<T, QueueError>;

    /// Removes the oldest item, blocking indefinitely.
    ///
    /// # Errors
    ///
    /// [`QueueError::Disposed`].
    fn take(&self) -> Result<T, QueueError> {
        self.take_with(None)
    }

    /// Removes the oldest item, giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// [`QueueError::TakeTimeout`] or [`QueueError::Disposed`].
    fn take_timeout(&self, timeout: Duration) -> Result<T, QueueError> {
        self.take_with(Some(timeout))
    }

    /// Blocking iterator over items as they arrive.
    ///
    /// Ends once the queue is disposed.
    fn iter(&self) -> Iter<'_, T, Self>
    where
        Self: Sized,
    {
        Iter::new(self)
    }
}
