use std::fmt;
use std::sync::Arc;

use crate::clock::{Clock, MonotonicClock};

/// Construction options for a sequencer.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use nexus_sequencer::{Config, ManualClock};
///
/// let config = Config::default()
///     .name("orders")
///     .clock(Arc::new(ManualClock::new()));
/// assert_eq!(config.thread_name(), Some("orders"));
/// ```
#[derive(Clone)]
pub struct Config {
    name: Option<String>,
    clock: Arc<dyn Clock>,
}

impl Config {
    /// Sets the worker thread name. Defaults to `nexus-seq-<id>`.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the clock deadlines are computed against.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The configured worker thread name, if any.
    pub fn thread_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn into_parts(self) -> (Option<String>, Arc<dyn Clock>) {
        (self.name, self.clock)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: None,
            clock: Arc::new(MonotonicClock),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
