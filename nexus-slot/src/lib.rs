//! Single-assignment cell (IVar).
//!
//! Accepts exactly one successful write and serves any number of reads:
//! - `fill` stores the first value; later fills fail with
//!   [`CellError::AlreadyFilled`] and leave the cell untouched
//! - `read` blocks until the cell is filled, optionally with a deadline
//! - `peek` answers immediately with the value or `None`
//!
//! # State Machine
//!
//! ```text
//!              fill(x) ok
//!   ┌───────┐ ───────────► ┌──────────┐
//!   │ Empty │              │ Filled x │ ◄─┐ fill(y) -> AlreadyFilled
//!   └───────┘              └──────────┘ ──┘
//!     read: waits            read: x
//!     peek: None             peek: Some(x)
//! ```
//!
//! Like `nexus-channel`, the cell's state is owned by a sequencer thread.
//! Blocked readers are pending `Read` requests. The step that applies the
//! first fill also answers every one of them with the stored value before
//! any deadline is looked at again, so a reader parked before the fill can
//! no longer time out behind its siblings. A reader
//! whose deadline elapses is answered with [`CellError::ReadTimeout`] and
//! removed by the sequencer itself, so a later fill can never reach a reader
//! that already gave up.
//!
//! # Example
//!
//! ```rust
//! use std::thread;
//! use nexus_slot::{CellError, IVar};
//!
//! let cell = IVar::<String>::new().unwrap();
//!
//! let reader = cell.clone();
//! let handle = thread::spawn(move || reader.read().unwrap());
//!
//! cell.fill("ready".to_string()).unwrap();
//! assert!(matches!(cell.fill("late".to_string()), Err(CellError::AlreadyFilled)));
//!
//! assert_eq!(handle.join().unwrap(), "ready");
//! assert_eq!(cell.peek().unwrap().as_deref(), Some("ready"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use nexus_sequencer::{Config, InstanceId, Machine, Reply, Sequencer};

pub use error::CellError;

enum Request<T> {
    Fill(T, Reply<Result<(), CellError>>),
    Read(Reply<Result<T, CellError>>),
    Peek(Reply<Option<T>>),
}

/// The value owned by the cell's worker.
struct Slot<T> {
    value: Option<T>,
}

impl<T: Clone + Send + 'static> Machine for Slot<T> {
    type Request = Request<T>;

    // Empty  -> Fill, Peek
    // Filled -> Fill (fails), Peek, Read
    fn admits(&self, request: &Request<T>) -> bool {
        match request {
            Request::Fill(..) | Request::Peek(_) => true,
            Request::Read(_) => self.value.is_some(),
        }
    }

    fn apply(&mut self, request: Request<T>) {
        match request {
            Request::Fill(value, reply) => {
                let outcome = if self.value.is_none() {
                    self.value = Some(value);
                    tracing::trace!("cell filled");
                    Ok(())
                } else {
                    tracing::trace!("rejected second fill");
                    Err(CellError::AlreadyFilled)
                };
                let _ = reply.send(outcome);
            }
            Request::Read(reply) => {
                if let Some(value) = &self.value {
                    let _ = reply.send(Ok(value.clone()));
                }
            }
            Request::Peek(reply) => {
                let _ = reply.send(self.value.clone());
            }
        }
    }

    fn expire(&mut self, request: Request<T>) {
        match request {
            Request::Read(reply) => {
                let _ = reply.send(Err(CellError::ReadTimeout));
            }
            Request::Peek(reply) => {
                let _ = reply.send(self.value.clone());
            }
            // Fill is never submitted with a deadline.
            Request::Fill(..) => {}
        }
    }

    // Every parked reader is answered in the step that fills the cell.
    fn releases_waiters(request: &Request<T>) -> bool {
        matches!(request, Request::Fill(..))
    }

    fn kind(request: &Request<T>) -> &'static str {
        match request {
            Request::Fill(..) => "fill",
            Request::Read(_) => "read",
            Request::Peek(_) => "peek",
        }
    }
}

/// A write-once cell with blocking reads.
///
/// Clones share the cell. Dropping the last clone disposes it.
pub struct IVar<T: Clone + Send + 'static> {
    sequencer: Arc<Sequencer<Request<T>>>,
}

impl<T: Clone + Send + 'static> IVar<T> {
    /// Creates an empty cell.
    ///
    /// # Errors
    ///
    /// [`CellError::Spawn`] if the worker thread cannot start.
    pub fn new() -> Result<Self, CellError> {
        Self::with_config(Config::default())
    }

    /// Creates an empty cell with a custom sequencer configuration.
    ///
    /// # Errors
    ///
    /// [`CellError::Spawn`] if the worker thread cannot start.
    pub fn with_config(config: Config) -> Result<Self, CellError> {
        let sequencer = Sequencer::spawn(Slot { value: None }, config)?;
        Ok(Self {
            sequencer: Arc::new(sequencer),
        })
    }

    /// Identity of the cell, stable for its lifetime.
    #[inline]
    pub fn id(&self) -> InstanceId {
        self.sequencer.id()
    }

    /// Stores `value` if the cell is empty, waking every blocked reader.
    ///
    /// # Errors
    ///
    /// [`CellError::AlreadyFilled`] if a value is already stored (the cell is
    /// unchanged), [`CellError::Disposed`] after disposal.
    pub fn fill(&self, value: T) -> Result<(), CellError> {
        self.sequencer
            .call(None, |reply| Request::Fill(value, reply))?
    }

    /// Like [`fill`](Self::fill), for callers that treat a second fill as a
    /// bug.
    ///
    /// # Panics
    ///
    /// Panics if the cell was already filled or has been disposed.
    #[track_caller]
    pub fn fill_or_panic(&self, value: T) {
        if let Err(err) = self.fill(value) {
            panic!("IVar {} fill failed: {err}", self.id());
        }
    }

    /// Returns the value, blocking until the cell is filled or `timeout`
    /// elapses.
    ///
    /// # Errors
    ///
    /// [`CellError::ReadTimeout`] if the deadline passed first,
    /// [`CellError::Disposed`] after disposal.
    pub fn read_with(&self, timeout: Option<Duration>) -> Result<T, CellError> {
        self.sequencer.call(timeout, Request::Read)?
    }

    /// Returns the value, blocking until the cell is filled.
    ///
    /// # Errors
    ///
    /// [`CellError::Disposed`] after disposal.
    pub fn read(&self) -> Result<T, CellError> {
        self.read_with(None)
    }

    /// Returns the value, giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// [`CellError::ReadTimeout`] or [`CellError::Disposed`].
    pub fn read_timeout(&self, timeout: Duration) -> Result<T, CellError> {
        self.read_with(Some(timeout))
    }

    /// Returns the value if filled, `None` otherwise. Never waits for a fill.
    ///
    /// # Errors
    ///
    /// [`CellError::Disposed`] after disposal.
    pub fn peek(&self) -> Result<Option<T>, CellError> {
        Ok(self.sequencer.call(None, Request::Peek)?)
    }

    /// Returns `true` if the cell holds a value.
    ///
    /// A disposed cell reports `false`.
    pub fn is_filled(&self) -> bool {
        matches!(self.peek(), Ok(Some(_)))
    }

    /// Stops the cell. Blocked and later operations fail with
    /// [`CellError::Disposed`]. Idempotent.
    pub fn dispose(&self) {
        self.sequencer.dispose();
    }

    /// Returns `true` once the cell has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.sequencer.is_disposed()
    }
}

impl<T: Clone + Send + 'static> Clone for IVar<T> {
    fn clone(&self) -> Self {
        Self {
            sequencer: Arc::clone(&self.sequencer),
        }
    }
}

impl<T: Clone + Send + 'static> fmt::Debug for IVar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IVar")
            .field("id", &self.id())
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}
