//! # nexus-sequencer
//!
//! A single-owner request sequencer: one worker thread owns a piece of state
//! and resolves requests against it one at a time, choosing which pending
//! request to service from a policy over the current state.
//!
//! This is the engine under `nexus-channel`'s bounded queue and
//! `nexus-slot`'s single-assignment cell.
//!
//! ## Model
//!
//! ```text
//!  caller ──submit(request, deadline)──► inbox ──► worker
//!     ▲                                              │
//!     └──────────── reply (one-shot) ◄───────────────┘
//!
//! worker loop:
//!   1. move every queued request into the pending set (arrival order)
//!   2. first pending request past its deadline?   -> expire it
//!   3. else first pending request admitted now?   -> apply it
//!   4. else block until a new request or the earliest deadline
//! ```
//!
//! - **No locks around state.** Only the worker touches the [`Machine`].
//! - **Deadlines are absolute.** Fixed from the [`Clock`] at submission;
//!   waiting in the pending set counts against them.
//! - **Timeouts resolve on the owning side.** A caller never gives up on its
//!   own, so a request that timed out is guaranteed to have had no effect.
//! - **FIFO per kind.** The scan always takes the earliest admissible request.
//!
//! ## Disposal
//!
//! [`Sequencer::dispose`] stops the worker. Requests still pending are
//! dropped together with their reply slots, and their callers observe
//! [`SequencerError::Disposed`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod clock;
mod config;
mod deadline;
mod error;
mod id;
mod machine;
mod pending;
mod sequencer;
mod trace;
mod worker;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::Config;
pub use deadline::Deadline;
pub use error::SequencerError;
pub use id::InstanceId;
pub use machine::Machine;
pub use sequencer::{Reply, Sequencer};
pub use trace::init_tracing;
