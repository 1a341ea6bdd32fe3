use std::io::{self, IsTerminal};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::Layer;
use tracing_subscriber::prelude::*;

/// Logs to stderr so nothing but the generated script ever lands on stdout.
///
/// The filter comes from `RUST_LOG`, defaulting to warnings and errors.
pub fn init_logger() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    let layer = Layer::new()
        .compact()
        .without_time()
        .with_target(false)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr);

    // A subscriber may already be installed when running under a test harness.
    _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}
