use thiserror::Error;

use crate::errors::CoreError;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required field: {field}. {hint}")]
    MissingRequired { field: String, hint: String },

    #[error("Invalid value for field '{field}': '{value}'. Expected: {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Configuration validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Environment variable error: {message}")]
    EnvironmentError { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConfigError {
    /// Create a missing required field error
    pub fn missing_required(field: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::MissingRequired {
            field: field.into(),
            hint: hint.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Create a validation failed error
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    /// Create an environment error
    pub fn environment_error(message: impl Into<String>) -> Self {
        Self::EnvironmentError {
            message: message.into(),
        }
    }
}

impl From<ConfigError> for CoreError {
    fn from(error: ConfigError) -> Self {
        CoreError::configuration(error.to_string())
    }
}

/// Trait for validating configuration values
pub trait ConfigValidator<T: ?Sized> {
    fn validate(&self, value: &T) -> Result<(), ConfigError>;
}

/// Accepts one of the tracing level names
pub struct LogLevelValidator {
    pub field: &'static str,
}

impl LogLevelValidator {
    pub const LEVELS: [&'static str; 5] = ["error", "warn", "info", "debug", "trace"];
}

impl ConfigValidator<str> for LogLevelValidator {
    fn validate(&self, value: &str) -> Result<(), ConfigError> {
        if Self::LEVELS.contains(&value.to_lowercase().as_str()) {
            Ok(())
        } else {
            Err(ConfigError::invalid_value(
                self.field,
                value,
                format!("one of: {}", Self::LEVELS.join(", ")),
            ))
        }
    }
}

/// Accepts anything `tracing_subscriber::EnvFilter` can parse
pub struct EnvFilterValidator;

impl ConfigValidator<str> for EnvFilterValidator {
    fn validate(&self, value: &str) -> Result<(), ConfigError> {
        tracing_subscriber::EnvFilter::try_new(value)
            .map(|_| ())
            .map_err(|e| ConfigError::invalid_value("logging.env_filter", value, e.to_string()))
    }
}

/// Parse a boolean flag the way environment variables usually spell it
pub fn parse_flag(field: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid_value(field, value, "true or false")),
    }
}
