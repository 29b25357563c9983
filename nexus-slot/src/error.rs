use std::io;

use nexus_sequencer::SequencerError;
use thiserror::Error;

/// Errors returned by [`IVar`](crate::IVar).
#[derive(Debug, Error)]
pub enum CellError {
    /// The read deadline elapsed before the cell was filled.
    #[error("timed out waiting for the cell to be filled")]
    ReadTimeout,

    /// The cell already holds a value; the new one was discarded.
    #[error("cell already filled")]
    AlreadyFilled,

    /// The cell was disposed before the operation completed.
    #[error("cell disposed")]
    Disposed,

    /// The cell's worker thread could not be started.
    #[error("failed to spawn cell thread: {0}")]
    Spawn(#[source] io::Error),
}

impl From<SequencerError> for CellError {
    fn from(err: SequencerError) -> Self {
        match err {
            SequencerError::Disposed => CellError::Disposed,
            SequencerError::Spawn(err) => CellError::Spawn(err),
        }
    }
}
