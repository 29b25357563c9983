//! Tracing setup for tests, benches and binaries.
//!
//! Library code only emits events through the `tracing` macros. Installing a
//! subscriber needs the `subscriber` feature; without it [`init_tracing`]
//! does nothing.

/// Installs a global fmt subscriber with thread names and uptime stamps.
///
/// Honors `RUST_LOG`, defaulting to `nexus=debug`. Safe to call more than
/// once; only the first call installs anything.
#[cfg(feature = "subscriber")]
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nexus=debug"));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_names(true)
                .with_file(false)
                .with_line_number(false)
                .with_timer(fmt::time::uptime())
                .with_test_writer(),
        )
        .with(filter)
        .try_init();
}

/// No-op without the `subscriber` feature.
#[cfg(not(feature = "subscriber"))]
pub fn init_tracing() {}
