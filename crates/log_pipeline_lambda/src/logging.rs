use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Installs JSON log output for the Lambda process.
///
/// The filter comes from `RUST_LOG` when set. CloudWatch stamps each line, so
/// the subscriber omits its own timestamp.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_current_span(false)
        .without_time()
        .with_target(false)
        .init();
}
