use tracing_subscriber::EnvFilter;

/// Filter directives, e.g. `birkenbihl_core=debug`.
pub const LOG_ENV: &str = "BIRKENBIHL_LOG";

/// Installs the stderr subscriber. Stdout carries protocol responses only.
/// Calling it twice is harmless.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
