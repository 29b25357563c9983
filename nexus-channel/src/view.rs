//! Capability-restricting views.
//!
//! A [`Producer`] exposes only the enqueue side of whatever it wraps; a
//! [`Consumer`] exposes only the dequeue side. Each view gets its own
//! [`InstanceId`] and remembers the identity one layer down, so a chain of
//! views can be traced back to the queue:
//!
//! ```
//! use nexus_channel::{BoundedQueue, Endpoint, Producer};
//!
//! let queue = BoundedQueue::<u8>::new(4).unwrap();
//! let outer = Producer::new(queue.producer());
//!
//! assert_ne!(outer.id(), outer.wrapped_id());
//! assert_eq!(outer.inner().wrapped_id(), queue.id());
//! assert_eq!(outer.capacity(), 4);
//! ```

use std::fmt;
use std::time::Duration;

use nexus_sequencer::InstanceId;

use crate::error::QueueError;
use crate::side::{Dequeue, Endpoint, Enqueue};

/// Enqueue-only view over `Q`.
#[derive(Clone)]
pub struct Producer<Q> {
    id: InstanceId,
    inner: Q,
}

impl<Q: Endpoint> Producer<Q> {
    /// Wraps `inner` under a fresh identity.
    pub fn new(inner: Q) -> Self {
        Self {
            id: InstanceId::next(),
            inner,
        }
    }

    /// Identity of the wrapped handle.
    #[inline]
    pub fn wrapped_id(&self) -> InstanceId {
        self.inner.id()
    }

    /// The wrapped handle.
    #[inline]
    pub fn inner(&self) -> &Q {
        &self.inner
    }
}

impl<Q: Endpoint> Endpoint for Producer<Q> {
    fn id(&self) -> InstanceId {
        self.id
    }

    fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    fn count(&self) -> Result<usize, QueueError> {
        self.inner.count()
    }
}

impl<T, Q: Enqueue<T>> Enqueue<T> for Producer<Q> {
    fn put_with(&self, timeout: Option<Duration>, value: T) -> Result<(), QueueError> {
        self.inner.put_with(timeout, value)
    }
}

impl<Q: Endpoint> fmt::Debug for Producer<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("id", &self.id)
            .field("wrapped_id", &self.wrapped_id())
            .finish_non_exhaustive()
    }
}

/// Dequeue-only view over `Q`.
#[derive(Clone)]
pub struct Consumer<Q> {
    id: InstanceId,
    inner: Q,
}

impl<Q: Endpoint> Consumer<Q> {
    /// Wraps `inner` under a fresh identity.
    pub fn new(inner: Q) -> Self {
        Self {
            id: InstanceId::next(),
            inner,
        }
    }

    /// Identity of the wrapped handle.
    #[inline]
    pub fn wrapped_id(&self) -> InstanceId {
        self.inner.id()
    }

    /// The wrapped handle.
    #[inline]
    pub fn inner(&self) -> &Q {
        &self.inner
    }
}

impl<Q: Endpoint> Endpoint for Consumer<Q> {
    fn id(&self) -> InstanceId {
        self.id
    }

    fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    fn count(&self) -> Result<usize, QueueError> {
        self.inner.count()
    }
}

impl<T, Q: Dequeue<T>> Dequeue<T> for Consumer<Q> {
    fn take_with(&self, timeout: Option<Duration>) -> Result<T, QueueError> {
        self.inner.take_with(timeout)
    }
}

impl<Q: Endpoint> fmt::Debug for Consumer<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("id", &self.id)
            .field("wrapped_id", &self.wrapped_id())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BoundedQueue;
    use std::thread;

    #[test]
    fn views_have_fresh_ids() {
        let queue = BoundedQueue::<u8>::new(2).unwrap();
        let producer = queue.producer();
        let consumer = queue.consumer();

        assert_ne!(producer.id(), queue.id());
        assert_ne!(consumer.id(), queue.id());
        assert_ne!(producer.id(), consumer.id());
        assert_eq!(producer.wrapped_id(), queue.id());
        assert_eq!(consumer.wrapped_id(), queue.id());
    }

    #[test]
    fn rewrapping_points_one_layer_down() {
        let queue = BoundedQueue::<u8>::new(2).unwrap();
        let inner = queue.consumer();
        let inner_id = inner.id();
        let outer = Consumer::new(inner);

        assert_eq!(outer.wrapped_id(), inner_id);
        assert_eq!(outer.inner().wrapped_id(), queue.id());
        assert_ne!(outer.id(), inner_id);
    }

    #[test]
    fn views_forward_capacity_count_and_blocking() {
        let queue = BoundedQueue::new(1).unwrap();
        let producer = Producer::new(queue.producer());
        let consumer = Consumer::new(queue.consumer());

        assert_eq!(producer.capacity(), 1);
        assert_eq!(consumer.capacity(), 1);

        producer.put(5u32).unwrap();
        assert_eq!(consumer.count().unwrap(), 1);
        assert!(matches!(
            producer.put_timeout(6, Duration::from_millis(1)),
            Err(QueueError::PutTimeout)
        ));

        let handle = thread::spawn(move || consumer.take().unwrap());
        assert_eq!(handle.join().unwrap(), 5);
        assert_eq!(producer.count().unwrap(), 0);
    }

    #[test]
    fn clone_keeps_identity() {
        let queue = BoundedQueue::<u8>::new(1).unwrap();
        let producer = queue.producer();
        assert_eq!(producer.clone().id(), producer.id());
    }
}
