use tracing_subscriber::EnvFilter;

/// Initialize a stdout tracing subscriber.
///
/// `RUST_LOG` wins over the configured filter when set.
pub fn init_stdout_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
