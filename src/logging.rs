//! Logging setup via `tracing`.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter: `RUST_LOG` wins over the configured level.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber: console output, plus a plain-text copy in
/// `log_file` (truncated on startup) when given.
///
/// A log file that cannot be created is reported and skipped.
pub fn init_logging(level: &str, log_file: Option<&Path>) {
    let console_layer = fmt::layer().with_target(true).with_level(true);
    let subscriber = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(console_layer);

    let file = log_file.map(|path| (path, File::create(path)));
    match file {
        Some((_, Ok(file))) => {
            let file_layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true);
            subscriber.with(file_layer).init();
        }
        Some((path, Err(err))) => {
            subscriber.init();
            tracing::warn!("could not open log file {}: {err}", path.display());
        }
        None => subscriber.init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_from_level() {
        std::env::remove_var("RUST_LOG");
        assert_eq!(env_filter("warn").to_string(), "warn");
        assert_eq!(
            env_filter("debug,biome_mapper=trace").to_string(),
            EnvFilter::new("debug,biome_mapper=trace").to_string()
        );
    }
}
