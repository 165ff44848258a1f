use serde::{Deserialize, Serialize};

/// Lifetime policy attached to every binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceScope {
    /// Single instance shared across the application
    Singleton,
    /// One instance per request context
    PerRequestSingleton,
    /// New instance created on every resolution
    Transient,
    /// Pre-built instance handed in at registration time
    Instance,
}

impl ServiceScope {
    /// Check if the scope is singleton
    pub fn is_singleton(&self) -> bool {
        matches!(self, ServiceScope::Singleton)
    }

    /// Check if the scope is per request
    pub fn is_per_request(&self) -> bool {
        matches!(self, ServiceScope::PerRequestSingleton)
    }

    /// Check if the scope is transient
    pub fn is_transient(&self) -> bool {
        matches!(self, ServiceScope::Transient)
    }

    /// Check if the binding wraps a pre-built instance
    pub fn is_instance(&self) -> bool {
        matches!(self, ServiceScope::Instance)
    }

    /// Get the scope name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceScope::Singleton => "singleton",
            ServiceScope::PerRequestSingleton => "per_request",
            ServiceScope::Transient => "transient",
            ServiceScope::Instance => "instance",
        }
    }
}

impl Default for ServiceScope {
    fn default() -> Self {
        ServiceScope::Singleton
    }
}

impl std::fmt::Display for ServiceScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ServiceScope {
    type Err = crate::errors::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "singleton" => Ok(ServiceScope::Singleton),
            "per_request" | "per-request" | "scoped" => Ok(ServiceScope::PerRequestSingleton),
            "transient" => Ok(ServiceScope::Transient),
            "instance" => Ok(ServiceScope::Instance),
            _ => Err(crate::errors::CoreError::InvalidServiceScope {
                scope: s.to_string(),
            }),
        }
    }
}

/// What the store does when a key is registered twice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Last write wins
    #[default]
    Replace,
    /// Second registration fails with `DuplicateRegistration`
    Reject,
}

impl DuplicatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicatePolicy::Replace => "replace",
            DuplicatePolicy::Reject => "reject",
        }
    }
}

impl std::fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = crate::config::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "replace" | "override" => Ok(DuplicatePolicy::Replace),
            "reject" | "error" => Ok(DuplicatePolicy::Reject),
            _ => Err(crate::config::ConfigError::invalid_value(
                "duplicate_policy",
                s,
                "replace or reject",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_scope_from_str() {
        assert_eq!("singleton".parse::<ServiceScope>().unwrap(), ServiceScope::Singleton);
        assert_eq!(
            "per_request".parse::<ServiceScope>().unwrap(),
            ServiceScope::PerRequestSingleton
        );
        assert_eq!("scoped".parse::<ServiceScope>().unwrap(), ServiceScope::PerRequestSingleton);
        assert_eq!("transient".parse::<ServiceScope>().unwrap(), ServiceScope::Transient);
        assert_eq!("instance".parse::<ServiceScope>().unwrap(), ServiceScope::Instance);

        assert!("invalid".parse::<ServiceScope>().is_err());
    }

    #[test]
    fn test_service_scope_display() {
        assert_eq!(format!("{}", ServiceScope::Singleton), "singleton");
        assert_eq!(format!("{}", ServiceScope::PerRequestSingleton), "per_request");
        assert_eq!(format!("{}", ServiceScope::Transient), "transient");
        assert_eq!(format!("{}", ServiceScope::Instance), "instance");
    }

    #[test]
    fn test_duplicate_policy_parse() {
        assert_eq!("Reject".parse::<DuplicatePolicy>().unwrap(), DuplicatePolicy::Reject);
        assert_eq!("override".parse::<DuplicatePolicy>().unwrap(), DuplicatePolicy::Replace);
        assert!("stack".parse::<DuplicatePolicy>().is_err());
        assert_eq!(DuplicatePolicy::default(), DuplicatePolicy::Replace);
    }
}
