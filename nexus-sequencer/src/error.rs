use std::io;

use thiserror::Error;

/// Errors raised by the sequencer itself.
#[derive(Debug, Error)]
pub enum SequencerError {
    /// The sequencer was disposed before the request could be answered.
    #[error("sequencer disposed")]
    Disposed,
    /// The worker thread could not be started.
    #[error("failed to spawn sequencer thread: {0}")]
    Spawn(#[from] io::Error),
}
