//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! Logs go to stderr so stdout carries only command output. `RUST_LOG`
//! overrides the level chosen on the command line.

use std::io;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(level: LevelFilter, format: LogFormat) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = build_env_filter(level);
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_writer(io::stderr).without_time())
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(io::stderr).without_time())
            .try_init(),
    }
}

/// Our crates log at `level`; everything else stays at warn.
fn build_env_filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level.to_string().to_lowercase();
        EnvFilter::new(format!("warn,nineml_client={level},dispatch_core={level}"))
    })
}
