//! The worker loop that owns a machine and its pending requests.

use std::sync::Arc;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use tracing::{debug, trace};

use crate::clock::Clock;
use crate::deadline::Deadline;
use crate::id::InstanceId;
use crate::machine::Machine;
use crate::pending::{Pending, PendingSet};

/// Message from a sequencer handle to its worker.
pub(crate) enum Command<R> {
    Submit {
        request: R,
        deadline: Option<Deadline>,
    },
    Dispose,
}

pub(crate) struct Worker<M: Machine> {
    id: InstanceId,
    machine: M,
    pending: PendingSet<M::Request>,
    inbox: Receiver<Command<M::Request>>,
    clock: Arc<dyn Clock>,
    next_ticket: u64,
}

impl<M: Machine> Worker<M> {
    pub(crate) fn new(
        id: InstanceId,
        machine: M,
        inbox: Receiver<Command<M::Request>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            id,
            machine,
            pending: PendingSet::new(),
            inbox,
            clock,
            next_ticket: 0,
        }
    }

    /// Runs until disposed or every handle is gone.
    ///
    /// Each pass moves newly arrived commands into the pending set, then
    /// resolves at most one request. Only when nothing is resolvable does the
    /// worker block, and then only until the next command or the earliest
    /// pending deadline.
    pub(crate) fn run(mut self) {
        debug!(id = %self.id, "sequencer started");

        loop {
            if !self.absorb() {
                break;
            }
            if self.step() {
                continue;
            }
            if !self.idle() {
                break;
            }
        }

        self.shutdown();
    }

    /// Drains the inbox without blocking. Returns `false` once told to stop.
    fn absorb(&mut self) -> bool {
        loop {
            match self.inbox.try_recv() {
                Ok(command) => {
                    if !self.accept(command) {
                        return false;
                    }
                }
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn accept(&mut self, command: Command<M::Request>) -> bool {
        match command {
            Command::Submit { request, deadline } => {
                let ticket = self.next_ticket;
                self.next_ticket += 1;
                trace!(
                    id = %self.id,
                    ticket,
                    kind = M::kind(&request),
                    timed = deadline.is_some(),
                    "request queued"
                );
                self.pending.push(Pending {
                    ticket,
                    request,
                    deadline,
                });
                true
            }
            Command::Dispose => false,
        }
    }

    /// Resolves one request. Expired requests win over admissible ones.
    fn step(&mut self) -> bool {
        if self.pending.is_empty() {
            return false;
        }
        let now = self.clock.now();

        if let Some(expired) = self.pending.take_expired(now) {
            trace!(
                id = %self.id,
                ticket = expired.ticket,
                kind = M::kind(&expired.request),
                "request expired"
            );
            self.machine.expire(expired.request);
            return true;
        }

        let machine = &self.machine;
        if let Some(ready) = self.pending.take_first(|request| machine.admits(request)) {
            trace!(
                id = %self.id,
                ticket = ready.ticket,
                kind = M::kind(&ready.request),
                "request serviced"
            );
            let release = M::releases_waiters(&ready.request);
            self.machine.apply(ready.request);
            if release {
                self.release_waiters();
            }
            return true;
        }

        false
    }

    /// Services every pending request the last apply made admissible,
    /// without consulting the clock in between.
    fn release_waiters(&mut self) {
        let mut released = 0usize;
        loop {
            let machine = &self.machine;
            let Some(ready) = self.pending.take_first(|request| machine.admits(request)) else {
                break;
            };
            self.machine.apply(ready.request);
            released += 1;
        }
        trace!(id = %self.id, released, "waiters released");
    }

    /// Blocks for the next command or the earliest deadline.
    fn idle(&mut self) -> bool {
        trace!(id = %self.id, parked = self.pending.len(), "worker idle");
        let command = match self.pending.next_deadline() {
            Some(deadline) => {
                let wait = deadline.remaining(self.clock.now());
                match self.inbox.recv_timeout(wait) {
                    Ok(command) => command,
                    Err(RecvTimeoutError::Timeout) => return true,
                    Err(RecvTimeoutError::Disconnected) => return false,
                }
            }
            None => match self.inbox.recv() {
                Ok(command) => command,
                Err(_) => return false,
            },
        };
        self.accept(command)
    }

    /// Abandons everything still pending or queued.
    ///
    /// Dropping a request drops its reply sender, which its caller observes
    /// as a disposal.
    fn shutdown(mut self) {
        let mut abandoned = self.pending.drain().count();
        while let Ok(command) = self.inbox.try_recv() {
            if matches!(command, Command::Submit { .. }) {
                abandoned += 1;
            }
        }
        debug!(id = %self.id, abandoned, "sequencer stopped");
    }
}
