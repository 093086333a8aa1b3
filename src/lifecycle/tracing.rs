/// Initializes the tracing/logging infrastructure for the application.
///
/// Structured logging via the `tracing` crate, filtered through the
/// `RUST_LOG` environment variable (e.g. `RUST_LOG=lunchpoll=debug`).
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
