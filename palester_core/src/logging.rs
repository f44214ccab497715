//! Logging infrastructure for Palester.
//!
//! Log output goes to stderr so it never mixes with command output on stdout.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Level used when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber for the CLI.
///
/// `RUST_LOG` overrides the default filter, e.g. `RUST_LOG=palester_core=debug`.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .init();
}

/// Route store and decoder warnings into the test harness output
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
