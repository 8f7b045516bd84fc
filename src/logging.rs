use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber for a binary.
///
/// `RUST_LOG` takes precedence; `default_directive` (e.g. `info`) is used when it is unset or
/// invalid. Logs go to stderr so they never mix with the client's output on stdout.
pub fn setup_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    // try_init: tests and embedders may already have installed a subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
