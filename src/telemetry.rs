use tracing::Subscriber;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Compose the JSON-formatted tracing subscriber.
///
/// `default_filter` applies when RUST_LOG is unset; composition is split
/// from installation so the pipeline can be inspected in isolation.
pub fn build_subscriber(default_filter: &str) -> impl Subscriber + Send + Sync {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stdout)
            .json(),
    )
}

/// Install the subscriber as the global default. Call once, at startup.
pub fn init_telemetry(default_filter: &str) {
    build_subscriber(default_filter).init();
}
