use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::SendError;
use nexus_sequencer::{Config, InstanceId, Machine, Reply, Sequencer};

use crate::error::QueueError;
use crate::iter::Iter;
use crate::side::{Dequeue, Endpoint, Enqueue};
use crate::view::{Consumer, Producer};

/// Occupancy of a bounded queue, derived from length and capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy {
    /// No items buffered.
    Empty,
    /// Some items buffered, room for more.
    Partial,
    /// Buffer at capacity.
    Full,
}

impl Occupancy {
    /// Classifies `len` items against `capacity`.
    #[inline]
    pub fn classify(len: usize, capacity: usize) -> Self {
        if len == 0 {
            Occupancy::Empty
        } else if len >= capacity {
            Occupancy::Full
        } else {
            Occupancy::Partial
        }
    }
}

pub(crate) enum Request<T> {
    Enqueue(T, Reply<Result<(), QueueError>>),
    Dequeue(Reply<Result<T, QueueError>>),
    Count(Reply<usize>),
}

/// The FIFO buffer owned by the queue's worker.
struct Buffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> Buffer<T> {
    fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    fn occupancy(&self) -> Occupancy {
        Occupancy::classify(self.items.len(), self.capacity)
    }
}

impl<T: Send + 'static> Machine for Buffer<T> {
    type Request = Request<T>;

    // Empty   -> Count, Enqueue
    // Partial -> Count, Enqueue, Dequeue
    // Full    -> Count, Dequeue
    fn admits(&self, request: &Request<T>) -> bool {
        match (self.occupancy(), request) {
            (_, Request::Count(_)) => true,
            (Occupancy::Full, Request::Enqueue(..)) => false,
            (_, Request::Enqueue(..)) => true,
            (Occupancy::Empty, Request::Dequeue(_)) => false,
            (_, Request::Dequeue(_)) => true,
        }
    }

    fn apply(&mut self, request: Request<T>) {
        match request {
            Request::Enqueue(value, reply) => {
                debug_assert!(self.items.len() < self.capacity);
                self.items.push_back(value);
                let _ = reply.send(Ok(()));
            }
            Request::Dequeue(reply) => {
                let Some(value) = self.items.pop_front() else {
                    return;
                };
                // Caller vanished mid-request: keep the item at the head.
                if let Err(SendError(Ok(value))) = reply.send(Ok(value)) {
                    self.items.push_front(value);
                }
            }
            Request::Count(reply) => {
                let _ = reply.send(self.items.len());
            }
        }
    }

    fn expire(&mut self, request: Request<T>) {
        match request {
            Request::Enqueue(_, reply) => {
                let _ = reply.send(Err(QueueError::PutTimeout));
            }
            Request::Dequeue(reply) => {
                let _ = reply.send(Err(QueueError::TakeTimeout));
            }
            Request::Count(reply) => {
                let _ = reply.send(self.items.len());
            }
        }
    }

    fn kind(request: &Request<T>) -> &'static str {
        match request {
            Request::Enqueue(..) => "enqueue",
            Request::Dequeue(_) => "dequeue",
            Request::Count(_) => "count",
        }
    }
}

/// A bounded, backpressured FIFO queue.
///
/// Any number of threads may put and take through clones of the same queue.
/// All state lives on a dedicated sequencer thread; `put` blocks while the
/// queue is full, `take` blocks while it is empty, and both accept an
/// optional deadline that is enforced by the sequencer itself.
///
/// Clones share the queue. Dropping the last clone disposes it.
///
/// # Example
///
/// ```
/// use std::thread;
/// use nexus_channel::BoundedQueue;
///
/// let queue = BoundedQueue::<u32>::new(2).unwrap();
///
/// let producer = queue.clone();
/// let handle = thread::spawn(move || {
///     for i in 0..5 {
///         producer.put(i).unwrap();
///     }
/// });
///
/// for i in 0..5 {
///     assert_eq!(queue.take().unwrap(), i);
/// }
/// handle.join().unwrap();
/// ```
pub struct BoundedQueue<T: Send + 'static> {
    sequencer: Arc<Sequencer<Request<T>>>,
    capacity: usize,
}

impl<T: Send + 'static> BoundedQueue<T> {
    /// Creates a queue holding at most `capacity` items.
    ///
    /// # Errors
    ///
    /// [`QueueError::InvalidCapacity`] if `capacity` is 0,
    /// [`QueueError::Spawn`] if the worker thread cannot start.
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        Self::with_config(capacity, Config::default())
    }

    /// Creates a queue with a custom sequencer configuration.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    ///
    /// # Example
    ///
    /// ```
    /// use nexus_channel::BoundedQueue;
    /// use nexus_sequencer::Config;
    ///
    /// let queue = BoundedQueue::<u64>::with_config(16, Config::default().name("ticks")).unwrap();
    /// assert_eq!(queue.capacity(), 16);
    /// ```
    pub fn with_config(capacity: usize, config: Config) -> Result<Self, QueueError> {
        if capacity < 1 {
            return Err(QueueError::InvalidCapacity(capacity));
        }
        let sequencer = Sequencer::spawn(Buffer::new(capacity), config)?;
        Ok(Self {
            sequencer: Arc::new(sequencer),
            capacity,
        })
    }

    /// Identity of the queue, stable for its lifetime.
    #[inline]
    pub fn id(&self) -> InstanceId {
        self.sequencer.id()
    }

    /// Fixed capacity. No round-trip to the sequencer.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Enqueues `value` with an optional timeout.
    ///
    /// # Errors
    ///
    /// [`QueueError::PutTimeout`] if the deadline elapsed while full (the
    /// value is not enqueued), [`QueueError::Disposed`] after disposal.
    pub fn put_with(&self, timeout: Option<Duration>, value: T) -> Result<(), QueueError> {
        self.sequencer
            .call(timeout, |reply| Request::Enqueue(value, reply))?
    }

    /// Enqueues `value`, blocking indefinitely while full.
    ///
    /// # Errors
    ///
    /// [`QueueError::Disposed`] after disposal.
    pub fn put(&self, value: T) -> Result<(), QueueError> {
        self.put_with(None, value)
    }

    /// Enqueues `value`, giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// [`QueueError::PutTimeout`] or [`QueueError::Disposed`].
    pub fn put_timeout(&self, value: T, timeout: Duration) -> Result<(), QueueError> {
        self.put_with(Some(timeout), value)
    }

    /// Removes the oldest item with an optional timeout.
    ///
    /// # Errors
    ///
    /// [`QueueError::TakeTimeout`] if the deadline elapsed while empty,
    /// [`QueueError::Disposed`] after disposal.
    pub fn take_with(&self, timeout: Option<Duration>) -> Result<T, QueueError> {
        self.sequencer.call(timeout, Request::Dequeue)?
    }

    /// Removes the oldest item, blocking indefinitely while empty.
    ///
    /// # Errors
    ///
    /// [`QueueError::Disposed`] after disposal.
    pub fn take(&self) -> Result<T, QueueError> {
        self.take_with(None)
    }

    /// Removes the oldest item, giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// [`QueueError::TakeTimeout`] or [`QueueError::Disposed`].
    pub fn take_timeout(&self, timeout: Duration) -> Result<T, QueueError> {
        self.take_with(Some(timeout))
    }

    /// Number of buffered items.
    ///
    /// Serviceable in every state, so this never waits behind blocked puts
    /// or takes.
    ///
    /// # Errors
    ///
    /// [`QueueError::Disposed`] after disposal.
    pub fn count(&self) -> Result<usize, QueueError> {
        Ok(self.sequencer.call(None, Request::Count)?)
    }

    /// Current occupancy classification.
    ///
    /// # Errors
    ///
    /// [`QueueError::Disposed`] after disposal.
    pub fn occupancy(&self) -> Result<Occupancy, QueueError> {
        Ok(Occupancy::classify(self.count()?, self.capacity))
    }

    /// Blocking iterator over items as they arrive; ends on disposal.
    pub fn iter(&self) -> Iter<'_, T, Self> {
        Iter::new(self)
    }

    /// A producer-only view over a clone of this queue.
    pub fn producer(&self) -> Producer<Self> {
        Producer::new(self.clone())
    }

    /// A consumer-only view over a clone of this queue.
    pub fn consumer(&self) -> Consumer<Self> {
        Consumer::new(self.clone())
    }

    /// Stops the queue. Buffered items are dropped and every pending or
    /// later operation fails with [`QueueError::Disposed`]. Idempotent.
    pub fn dispose(&self) {
        self.sequencer.dispose();
    }

    /// Returns `true` once the queue has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.sequencer.is_disposed()
    }
}

impl<T: Send + 'static> Clone for BoundedQueue<T> {
    fn clone(&self) -> Self {
        Self {
            sequencer: Arc::clone(&self.sequencer),
            capacity: self.capacity,
        }
    }
}

impl<T: Send + 'static> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedQueue")
            .field("id", &self.id())
            .field("capacity", &self.capacity)
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Endpoint for BoundedQueue<T> {
    fn id(&self) -> InstanceId {
        BoundedQueue::id(self)
    }

    fn capacity(&self) -> usize {
        BoundedQueue::capacity(self)
    }

    fn count(&self) -> Result<usize, QueueError> {
        BoundedQueue::count(self)
    }
}

impl<T: Send + 'static> Enqueue<T> for BoundedQueue<T> {
    fn put_with(&self, timeout: Option<Duration>, value: T) -> Result<(), QueueError> {
        BoundedQueue::put_with(self, timeout, value)
    }
}

impl<T: Send + 'static> Dequeue<T> for BoundedQueue<T> {
    fn take_with(&self, timeout: Option<Duration>) -> Result<T, QueueError> {
        BoundedQueue::take_with(self, timeout)
    }
}

impl<'a, T: Send + 'static> IntoIterator for &'a BoundedQueue<T> {
    type Item = T;
    type IntoIter = Iter<'a, T, BoundedQueue<T>>;

    fn into_iter(self) -> Self::IntoIter {
        Iter::new(self)
    }
}
