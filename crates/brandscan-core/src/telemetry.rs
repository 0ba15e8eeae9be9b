//! Tracing subscriber setup

use std::sync::OnceLock;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable
    #[default]
    Plain,
    /// One JSON object per line
    Json,
}

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Install the global subscriber, writing to stderr
///
/// Filtering follows `RUST_LOG` and defaults to `info`. Calling this more than
/// once, or after another subscriber was installed, does nothing.
pub fn init(format: LogFormat) {
    INSTALLED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry().with(filter);
        let result = match format {
            LogFormat::Plain => registry
                .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
                .try_init(),
            LogFormat::Json => registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init(),
        };
        if result.is_err() {
            tracing::debug!("global subscriber already installed");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init(LogFormat::Plain);
        init(LogFormat::Json);
        tracing::info!("still logging");
    }
}
