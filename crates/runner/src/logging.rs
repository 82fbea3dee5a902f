#![forbid(unsafe_code)]

use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr so stdout stays machine-readable.
pub(crate) fn init(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| {
        EnvFilter::new(crate::defaults::DEFAULT_LOG_FILTER)
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
