//! Diagnostic logging.
//!
//! Diagnostics go to stderr through `tracing`, leaving stdout to the
//! scenario output that tests inspect.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "FORKLAB_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Installs the global stderr subscriber.
///
/// Calling this more than once is harmless; later calls keep the subscriber
/// installed first.
pub fn init() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
