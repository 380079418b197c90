//! Logging init: structured diagnostics on stderr, user-facing output stays on stdout.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn,restage=info";
const VERBOSE_FILTER: &str = "info,restage=debug";

/// Install the global `tracing` subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A subscriber may already be installed (tests, embedding); keep the first one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
