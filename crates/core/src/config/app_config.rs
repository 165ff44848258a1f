use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{
    parse_flag, ConfigError, ConfigSource, ConfigValidator, EnvFilterValidator, LogLevelValidator,
};
use crate::container::DuplicatePolicy;
use crate::logging::LoggingConfig;

pub const ENV_ENVIRONMENT: &str = "SCOPEWIRE_ENV";
pub const ENV_DUPLICATE_POLICY: &str = "SCOPEWIRE_DUPLICATE_POLICY";
pub const ENV_EAGER_SINGLETONS: &str = "SCOPEWIRE_EAGER_SINGLETONS";
pub const ENV_REQUIRE_DIAGNOSTICS: &str = "SCOPEWIRE_REQUIRE_DIAGNOSTICS";
pub const ENV_LOG_LEVEL: &str = "SCOPEWIRE_LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "SCOPEWIRE_LOG_JSON";

/// Configuration trait for application configuration
pub trait AppConfigTrait: Sized {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self, ConfigError>;

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError>;

    /// Get configuration source information for debugging
    fn config_sources(&self) -> HashMap<String, ConfigSource>;
}

/// Environment enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Testing,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testing" | "test" => Ok(Environment::Testing),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::invalid_value(
                "environment",
                s,
                "development, testing, or production",
            )),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let env_str = match self {
            Environment::Development => "development",
            Environment::Testing => "testing",
            Environment::Production => "production",
        };
        write!(f, "{}", env_str)
    }
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    pub fn is_testing(&self) -> bool {
        matches!(self, Environment::Testing)
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Logging preset matching this environment
    pub fn logging(&self) -> LoggingConfig {
        match self {
            Environment::Development => LoggingConfig::development(),
            Environment::Testing => LoggingConfig::test(),
            Environment::Production => LoggingConfig::production(),
        }
    }
}

/// Settings of the bootstrap sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub environment: Environment,
    /// What the store does when a key is registered twice
    pub duplicate_policy: DuplicatePolicy,
    /// Build every singleton before reporting ready
    pub eager_singletons: bool,
    /// Fail the bootstrap when no diagnostics service is bound
    pub require_diagnostics: bool,
    pub logging: LoggingConfig,
    #[serde(skip)]
    sources: HashMap<String, ConfigSource>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl BootstrapConfig {
    /// Create configuration for development
    pub fn development() -> Self {
        Self::for_environment(Environment::Development)
    }

    /// Create configuration for testing
    pub fn testing() -> Self {
        Self::for_environment(Environment::Testing)
    }

    /// Create configuration for production.
    ///
    /// Duplicate registrations are rejected and singletons are built up front
    /// so construction failures surface before the first request.
    pub fn production() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Reject,
            eager_singletons: true,
            ..Self::for_environment(Environment::Production)
        }
    }

    fn for_environment(environment: Environment) -> Self {
        Self {
            environment,
            duplicate_policy: DuplicatePolicy::Replace,
            eager_singletons: false,
            require_diagnostics: false,
            logging: environment.logging(),
            sources: HashMap::new(),
        }
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self.sources
            .insert("duplicate_policy".to_string(), ConfigSource::Programmatic);
        self
    }

    pub fn with_eager_singletons(mut self, eager: bool) -> Self {
        self.eager_singletons = eager;
        self.sources
            .insert("eager_singletons".to_string(), ConfigSource::Programmatic);
        self
    }

    pub fn with_require_diagnostics(mut self, required: bool) -> Self {
        self.require_diagnostics = required;
        self.sources
            .insert("require_diagnostics".to_string(), ConfigSource::Programmatic);
        self
    }

    /// Parse YAML; omitted fields take the development defaults
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: BootstrapConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        config.sources = Self::yaml_sources(yaml, "inline")?;
        Ok(config)
    }

    /// Read and parse a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)?;
        let mut config: BootstrapConfig = serde_yaml::from_str(&yaml)?;
        config.validate()?;
        config.sources = Self::yaml_sources(&yaml, &path.display().to_string())?;
        Ok(config)
    }

    fn yaml_sources(
        yaml: &str,
        origin: &str,
    ) -> Result<HashMap<String, ConfigSource>, ConfigError> {
        let value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        let mut sources = HashMap::new();
        if let serde_yaml::Value::Mapping(mapping) = value {
            for key in mapping.keys().filter_map(|key| key.as_str()) {
                sources.insert(key.to_string(), ConfigSource::File(origin.to_string()));
            }
        }
        Ok(sources)
    }

    fn env_var(name: &str) -> Result<Option<String>, ConfigError> {
        match env::var(name) {
            Ok(value) => Ok(Some(value)),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(env::VarError::NotUnicode(_)) => {
                Err(ConfigError::environment_error(format!("{} is not valid unicode", name)))
            }
        }
    }

    fn source_for(name: &str, default: impl Into<String>) -> ConfigSource {
        if env::var(name).is_ok() {
            ConfigSource::EnvVar(name.to_string())
        } else {
            ConfigSource::Default(default.into())
        }
    }
}

impl AppConfigTrait for BootstrapConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let environment = match Self::env_var(ENV_ENVIRONMENT)? {
            Some(value) => value.parse()?,
            None => Environment::Development,
        };

        let mut config = match environment {
            Environment::Development => Self::development(),
            Environment::Testing => Self::testing(),
            Environment::Production => Self::production(),
        };

        if let Some(value) = Self::env_var(ENV_DUPLICATE_POLICY)? {
            config.duplicate_policy = value.parse()?;
        }

        if let Some(value) = Self::env_var(ENV_EAGER_SINGLETONS)? {
            config.eager_singletons = parse_flag("eager_singletons", &value)?;
        }

        if let Some(value) = Self::env_var(ENV_REQUIRE_DIAGNOSTICS)? {
            config.require_diagnostics = parse_flag("require_diagnostics", &value)?;
        }

        // An explicit level replaces the preset's filter directives
        if let Some(value) = Self::env_var(ENV_LOG_LEVEL)? {
            config.logging.level = value.to_lowercase();
            config.logging.env_filter = None;
        }

        if let Some(value) = Self::env_var(ENV_LOG_JSON)? {
            config.logging.json_format = parse_flag("logging.json_format", &value)?;
        }

        config.validate()?;
        config.sources = config.config_sources();
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        LogLevelValidator { field: "logging.level" }.validate(self.logging.level.as_str())?;

        if let Some(filter) = &self.logging.env_filter {
            EnvFilterValidator.validate(filter.as_str())?;
        }

        if self.logging.json_format && self.logging.pretty_print {
            return Err(ConfigError::validation_failed(
                "logging.json_format and logging.pretty_print are mutually exclusive",
            ));
        }

        Ok(())
    }

    fn config_sources(&self) -> HashMap<String, ConfigSource> {
        if !self.sources.is_empty() {
            return self.sources.clone();
        }

        let mut sources = HashMap::new();
        sources.insert(
            "environment".to_string(),
            Self::source_for(ENV_ENVIRONMENT, "development"),
        );
        sources.insert(
            "duplicate_policy".to_string(),
            Self::source_for(ENV_DUPLICATE_POLICY, "by environment"),
        );
        sources.insert(
            "eager_singletons".to_string(),
            Self::source_for(ENV_EAGER_SINGLETONS, "by environment"),
        );
        sources.insert(
            "require_diagnostics".to_string(),
            Self::source_for(ENV_REQUIRE_DIAGNOSTICS, "false"),
        );
        sources.insert(
            "logging.level".to_string(),
            Self::source_for(ENV_LOG_LEVEL, "by environment"),
        );
        sources.insert(
            "logging.json_format".to_string(),
            Self::source_for(ENV_LOG_JSON, "by environment"),
        );
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for name in [
            ENV_ENVIRONMENT,
            ENV_DUPLICATE_POLICY,
            ENV_EAGER_SINGLETONS,
            ENV_REQUIRE_DIAGNOSTICS,
            ENV_LOG_LEVEL,
            ENV_LOG_JSON,
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn test_presets() {
        let development = BootstrapConfig::development();
        assert_eq!(development.duplicate_policy, DuplicatePolicy::Replace);
        assert!(!development.eager_singletons);
        assert!(development.validate().is_ok());

        let production = BootstrapConfig::production();
        assert_eq!(production.duplicate_policy, DuplicatePolicy::Reject);
        assert!(production.eager_singletons);
        assert!(production.logging.json_format);
        assert!(production.validate().is_ok());

        assert!(BootstrapConfig::testing().validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = BootstrapConfig::from_env().unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert!(config.config_sources()["environment"].is_default());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        env::set_var(ENV_ENVIRONMENT, "prod");
        env::set_var(ENV_DUPLICATE_POLICY, "replace");
        env::set_var(ENV_REQUIRE_DIAGNOSTICS, "yes");
        env::set_var(ENV_LOG_LEVEL, "WARN");

        let config = BootstrapConfig::from_env().unwrap();
        clear_env();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Replace);
        assert!(config.require_diagnostics);
        assert!(config.eager_singletons);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.filter_directives(), "warn");

        let sources = config.config_sources();
        assert!(sources["duplicate_policy"].is_env_var());
        assert!(sources["eager_singletons"].is_default());
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_values() {
        clear_env();
        env::set_var(ENV_DUPLICATE_POLICY, "sometimes");
        let result = BootstrapConfig::from_env();
        clear_env();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        env::set_var(ENV_LOG_LEVEL, "chatty");
        let result = BootstrapConfig::from_env();
        clear_env();
        assert!(result.is_err());
    }

    #[test]
    fn test_from_yaml_str() {
        let config = BootstrapConfig::from_yaml_str(
            "environment: testing\nduplicate_policy: reject\nlogging:\n  level: debug\n",
        )
        .unwrap();

        assert_eq!(config.environment, Environment::Testing);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
        assert_eq!(config.logging.level, "debug");
        assert!(!config.eager_singletons);
        assert!(config.config_sources()["duplicate_policy"].is_file());
    }

    #[test]
    fn test_from_yaml_file() {
        let path = env::temp_dir().join(format!("scopewire-{}.yaml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "eager_singletons: true\n").unwrap();

        let config = BootstrapConfig::from_yaml_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(config.eager_singletons);

        assert!(matches!(
            BootstrapConfig::from_yaml_file(&path),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_invalid_yaml_logging() {
        let result =
            BootstrapConfig::from_yaml_str("logging:\n  json_format: true\n  pretty_print: true\n");
        assert!(matches!(result, Err(ConfigError::ValidationFailed { .. })));

        assert!(matches!(
            BootstrapConfig::from_yaml_str("duplicate_policy: [1, 2]"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
