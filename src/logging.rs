use tracing_subscriber::{fmt, EnvFilter};

/// Install the process-wide subscriber. Call once, from a binary's `main`.
///
/// Library code only emits events; `RUST_LOG` overrides `default_filter`.
pub fn init(default_filter: &str) {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr) // Log to stderr, stdout is for reports
        .init();
}
