//! Logging setup.
//!
//! Everything goes to stderr through `tracing-subscriber`, so stdout stays
//! reserved for command output. The level comes from `RUST_LOG` (a `.env`
//! file next to the working directory is honoured), defaulting to `info`.

use tracing_subscriber::{EnvFilter, fmt};

/// Initialise logging for the `fwfit` binary.
///
/// `RUST_LOG=debug` or `RUST_LOG=fieldwork_fit_step=trace` raise verbosity.
/// Calling this twice is harmless; the second call is ignored.
pub fn init() {
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .try_init();
}

/// Logging for tests: debug level, captured by the test harness.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
