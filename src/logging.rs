//! Logging init: stderr only, filter from `RUST_LOG`.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,archive_dl=debug";

/// Initialize structured logging to stderr. `quiet` lowers the default filter to warnings.
pub fn init_logging(quiet: bool) {
    let fallback = if quiet { "warn" } else { DEFAULT_FILTER };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false)
        .init();
}
