//! Diagnostic logging.
//!
//! Diagnostics go through `tracing` to stderr and are quiet by default.
//! The level comes from the `-v` count on the command line only.

use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

/// Maps a `-v` count to a filter directive.
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "error",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber. Call once, before organizing.
pub fn init_logging(verbosity: u8, ansi: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::new(format!(
        "{}={}",
        env!("CARGO_CRATE_NAME"),
        level_for_verbosity(verbosity)
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(ansi)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))
}
