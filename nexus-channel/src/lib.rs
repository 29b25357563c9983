//! A bounded, backpressured MPMC queue whose state is owned by a single
//! sequencer thread.
//!
//! Producers block while the queue is full, consumers block while it is
//! empty, and both may attach a deadline. There are no locks around the
//! buffer: every operation is a request to the queue's
//! [`nexus_sequencer::Sequencer`], which picks the next serviceable request
//! from its pending set.
//!
//! # Policy
//!
//! What the sequencer may service depends only on occupancy:
//!
//! ```text
//! ┌──────────┬─────────────────────────────┐
//! │ Empty    │ Count, Enqueue              │
//! │ Partial  │ Count, Enqueue, Dequeue     │
//! │ Full     │ Count, Dequeue              │
//! └──────────┴─────────────────────────────┘
//! ```
//!
//! Pending requests are scanned in arrival order. A request whose deadline
//! has passed is answered with a timeout before anything else is serviced;
//! otherwise the first admissible request wins. Requests of the same kind are
//! therefore serviced FIFO, and an Enqueue and a Dequeue that are both
//! admissible are serviced in the order they arrived.
//!
//! # Example
//!
//! ```
//! use std::thread;
//! use std::time::Duration;
//! use nexus_channel::{BoundedQueue, QueueError};
//!
//! let queue = BoundedQueue::new(2).unwrap();
//! queue.put('A').unwrap();
//! queue.put('B').unwrap();
//!
//! // Full: a timed put fails without enqueueing.
//! assert!(matches!(
//!     queue.put_timeout('X', Duration::from_millis(1)),
//!     Err(QueueError::PutTimeout)
//! ));
//! assert_eq!(queue.count().unwrap(), 2);
//!
//! // An untimed put waits for room.
//! let producer = queue.clone();
//! let blocked = thread::spawn(move || producer.put('C'));
//!
//! assert_eq!(queue.take().unwrap(), 'A');
//! blocked.join().unwrap().unwrap();
//! assert_eq!(queue.take().unwrap(), 'B');
//! assert_eq!(queue.take().unwrap(), 'C');
//! ```
//!
//! # Timeouts
//!
//! A timeout is turned into an absolute deadline when the call is made. The
//! sequencer, not the caller, decides that a deadline has passed, so a timed
//! out `put` is guaranteed not to have enqueued and a timed out `take` is
//! guaranteed not to have removed anything.
//!
//! # Views
//!
//! [`Producer`] and [`Consumer`] restrict a handle to one side. They forward
//! capacity, count and blocking behaviour unchanged, carry their own
//! identity, and can wrap each other. [`Sink`] bundles a producer view with a
//! background consumer thread running a handler.
//!
//! # Disposal
//!
//! [`BoundedQueue::dispose`] (or dropping the last clone) stops the
//! sequencer. Blocked and later calls fail with [`QueueError::Disposed`];
//! [`Iter`] simply ends.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod error;
mod iter;
mod queue;
mod side;
mod sink;
mod view;

pub use error::QueueError;
pub use iter::Iter;
pub use queue::{BoundedQueue, Occupancy};
pub use side::{Dequeue, Endpoint, Enqueue};
pub use sink::Sink;
pub use view::{Consumer, Producer};
