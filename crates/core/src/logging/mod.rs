//! Structured logging setup on top of `tracing-subscriber`.

pub mod config;

pub use config::LoggingConfig;

use std::io;

use thiserror::Error;
use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("Failed to install subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over the configured filter. Fails instead of
/// panicking when a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.filter_directives())?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let layer = Layer::new()
        .with_writer(io::stdout)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    if config.json_format {
        registry.with(layer.json()).try_init()?;
    } else if config.pretty_print {
        registry.with(layer.pretty()).try_init()?;
    } else {
        registry.with(layer).try_init()?;
    }

    tracing::info!(
        target: "scopewire_core::logging",
        level = %config.level,
        json = config.json_format,
        service = config.service_name.as_deref().unwrap_or("-"),
        "logging initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_presets() {
        assert!(LoggingConfig::production().json_format);
        assert!(LoggingConfig::development().include_location);
        assert_eq!(LoggingConfig::test().filter_directives(), "scopewire_core=error");
        assert_eq!(LoggingConfig::default().filter_directives(), "info");
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: LoggingConfig =
            serde_yaml::from_str("level: warn\njson_format: true\n").unwrap();
        assert_eq!(config.level, "warn");
        assert!(config.json_format);
        assert!(config.env_filter.is_none());
    }

    #[test]
    #[serial]
    fn test_second_init_reports_error() {
        std::env::remove_var("RUST_LOG");
        let config = LoggingConfig::test();
        let _ = init_logging(&config);
        assert!(matches!(init_logging(&config), Err(LoggingError::Init(_))));
    }

    #[test]
    #[serial]
    fn test_invalid_filter_is_rejected() {
        std::env::remove_var("RUST_LOG");
        let config = LoggingConfig::default().with_env_filter("scopewire_core=loud");
        assert!(matches!(init_logging(&config), Err(LoggingError::Filter(_))));
    }
}
