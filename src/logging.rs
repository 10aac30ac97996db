// src/logging.rs
// =============================================================================
// Log setup for the CLI.
//
// Logs go to stderr so stdout stays clean for the results (and --json).
// RUST_LOG wins when set; otherwise we log warnings, plus our own info
// (or debug with --verbose).
// =============================================================================

use tracing_subscriber::EnvFilter;

pub fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "warn,link_enqueuer=debug"
    } else {
        "warn,link_enqueuer=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // Only the first subscriber can be installed; that's fine
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
