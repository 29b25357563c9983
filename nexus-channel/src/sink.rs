use std::fmt;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use nexus_sequencer::{Config, InstanceId};
use tracing::debug;

use crate::error::QueueError;
use crate::queue::BoundedQueue;
use crate::side::{Dequeue, Endpoint, Enqueue};
use crate::view::Producer;

/// Fire-and-forget producer backed by its own queue and consumer thread.
///
/// Every item put into the sink is handed to `handler` on a background
/// thread, one at a time, in arrival order. Backpressure applies as usual:
/// `put` blocks once `capacity` items are waiting for the handler.
///
/// Dropping the sink disposes the queue and joins the consumer thread.
/// Items not yet handled at that point are dropped.
///
/// # Example
///
/// ```
/// use std::sync::mpsc;
/// use nexus_channel::{Enqueue, Sink};
///
/// let (seen_tx, seen_rx) = mpsc::channel();
/// let sink = Sink::spawn(8, move |n: u32| seen_tx.send(n * 10).unwrap()).unwrap();
///
/// sink.put(1).unwrap();
/// sink.put(2).unwrap();
///
/// assert_eq!(seen_rx.recv().unwrap(), 10);
/// assert_eq!(seen_rx.recv().unwrap(), 20);
/// ```
pub struct Sink<T: Send + 'static> {
    producer: Producer<BoundedQueue<T>>,
    consumer: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Sink<T> {
    /// Starts a sink with the default sequencer configuration.
    ///
    /// # Errors
    ///
    /// [`QueueError::InvalidCapacity`] if `capacity` is 0,
    /// [`QueueError::Spawn`] if either thread cannot start.
    pub fn spawn<F>(capacity: usize, handler: F) -> Result<Self, QueueError>
    where
        F: FnMut(T) + Send + 'static,
    {
        Self::with_config(capacity, Config::default(), handler)
    }

    /// Starts a sink with a custom sequencer configuration.
    ///
    /// # Errors
    ///
    /// Same as [`spawn`](Self::spawn).
    pub fn with_config<F>(capacity: usize, config: Config, mut handler: F) -> Result<Self, QueueError>
    where
        F: FnMut(T) + Send + 'static,
    {
        let queue = BoundedQueue::with_config(capacity, config)?;
        let consumer = queue.consumer();
        let id = queue.id();

        let handle = thread::Builder::new()
            .name(format!("nexus-sink-{}", id.as_u64()))
            .spawn(move || {
                let mut handled = 0u64;
                for item in consumer.iter() {
                    handler(item);
                    handled += 1;
                }
                debug!(%id, handled, "sink consumer finished");
            })
            .map_err(QueueError::Spawn)?;

        Ok(Self {
            producer: Producer::new(queue),
            consumer: Some(handle),
        })
    }

    /// The producer view this sink exposes.
    #[inline]
    pub fn producer(&self) -> &Producer<BoundedQueue<T>> {
        &self.producer
    }

    /// Identity of the backing queue.
    #[inline]
    pub fn wrapped_id(&self) -> InstanceId {
        self.producer.wrapped_id()
    }
}

impl<T: Send + 'static> Endpoint for Sink<T> {
    fn id(&self) -> InstanceId {
        self.producer.id()
    }

    fn capacity(&self) -> usize {
        self.producer.capacity()
    }

    fn count(&self) -> Result<usize, QueueError> {
        self.producer.count()
    }
}

impl<T: Send + 'static> Enqueue<T> for Sink<T> {
    fn put_with(&self, timeout: Option<Duration>, value: T) -> Result<(), QueueError> {
        self.producer.put_with(timeout, value)
    }
}

impl<T: Send + 'static> Drop for Sink<T> {
    fn drop(&mut self) {
        self.producer.inner().dispose();
        if let Some(handle) = self.consumer.take() {
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

impl<T: Send + 'static> fmt::Debug for Sink<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("producer", &self.producer)
            .finish_non_exhaustive()
    }
}
