use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Sender;

use crate::clock::Clock;
use crate::config::Config;
use crate::deadline::Deadline;
use crate::error::SequencerError;
use crate::id::InstanceId;
use crate::machine::Machine;
use crate::worker::{Command, Worker};

/// One-shot reply slot carried inside a request.
pub type Reply<T> = Sender<T>;

/// Handle to a worker thread that owns a [`Machine`].
///
/// The handle is `Sync`; any number of threads may submit through a shared
/// reference. Dropping it disposes the worker without waiting for it.
///
/// # Example
///
/// ```
/// use nexus_sequencer::{Config, Machine, Reply, Sequencer};
///
/// enum Request {
///     Add(u64, Reply<u64>),
/// }
///
/// struct Total(u64);
///
/// impl Machine for Total {
///     type Request = Request;
///
///     fn admits(&self, _: &Request) -> bool {
///         true
///     }
///
///     fn apply(&mut self, request: Request) {
///         let Request::Add(n, reply) = request;
///         self.0 += n;
///         let _ = reply.send(self.0);
///     }
///
///     fn expire(&mut self, _: Request) {}
/// }
///
/// let seq = Sequencer::spawn(Total(0), Config::default()).unwrap();
/// assert_eq!(seq.call(None, |r| Request::Add(2, r)).unwrap(), 2);
/// assert_eq!(seq.call(None, |r| Request::Add(3, r)).unwrap(), 5);
/// ```
pub struct Sequencer<R: Send + 'static> {
    id: InstanceId,
    inbox: Sender<Command<R>>,
    clock: Arc<dyn Clock>,
    disposed: AtomicBool,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<R: Send + 'static> Sequencer<R> {
    /// Starts a worker thread that owns `machine`.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::Spawn`] if the thread cannot be created.
    pub fn spawn<M>(machine: M, config: Config) -> Result<Self, SequencerError>
    where
        M: Machine<Request = R>,
    {
        let id = InstanceId::next();
        let (name, clock) = config.into_parts();
        let (inbox, rx) = crossbeam_channel::unbounded();

        let worker = Worker::new(id, machine, rx, Arc::clone(&clock));
        let handle = thread::Builder::new()
            .name(name.unwrap_or_else(|| format!("nexus-seq-{}", id.as_u64())))
            .spawn(move || worker.run())?;

        Ok(Self {
            id,
            inbox,
            clock,
            disposed: AtomicBool::new(false),
            worker: Mutex::new(Some(handle)),
        })
    }

    /// Returns this sequencer's identity.
    #[inline]
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Returns the clock deadlines are computed against.
    #[inline]
    pub fn clock(&self) -> &dyn Clock {
        &*self.clock
    }

    /// Queues `request` with a deadline of `now + timeout`.
    ///
    /// `None` waits indefinitely. The deadline is fixed here, before the
    /// request reaches the worker.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::Disposed`] if the sequencer has been torn
    /// down. The request is dropped.
    pub fn submit(&self, request: R, timeout: Option<Duration>) -> Result<(), SequencerError> {
        if self.is_disposed() {
            return Err(SequencerError::Disposed);
        }
        let deadline = Deadline::from_timeout(&*self.clock, timeout);
        self.inbox
            .send(Command::Submit { request, deadline })
            .map_err(|_| SequencerError::Disposed)
    }

    /// Submits a request built around a fresh reply slot and blocks for the
    /// answer.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::Disposed`] if the sequencer is torn down
    /// before answering.
    pub fn call<T, F>(&self, timeout: Option<Duration>, make: F) -> Result<T, SequencerError>
    where
        F: FnOnce(Reply<T>) -> R,
    {
        let (reply, answer) = crossbeam_channel::bounded(1);
        self.submit(make(reply), timeout)?;
        answer.recv().map_err(|_| SequencerError::Disposed)
    }

    /// Returns `true` once [`dispose`](Self::dispose) has been called.
    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Stops the worker and waits for it to exit.
    ///
    /// Requests still pending, and any submitted concurrently, are answered
    /// with [`SequencerError::Disposed`]. Idempotent.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        let _ = self.inbox.send(Command::Dispose);

        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

impl<R: Send + 'static> Drop for Sequencer<R> {
    fn drop(&mut self) {
        if !self.disposed.swap(true, Ordering::AcqRel) {
            let _ = self.inbox.send(Command::Dispose);
        }
    }
}

impl<R: Send + 'static> fmt::Debug for Sequencer<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequencer")
            .field("id", &self.id)
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}
