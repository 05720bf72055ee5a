use crate::cli::LogLevel;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// Install the global subscriber, writing to stderr
///
/// An explicit level wins; otherwise `RUST_LOG` is honoured, falling back to
/// `info`.
pub fn init(level: Option<LogLevel>) {
    let filter = match level {
        Some(level) => EnvFilter::new(LevelFilter::from(level).to_string()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
