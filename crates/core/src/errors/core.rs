use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core error type for bootstrapping and service resolution
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Duplicate registration for {service_type}")]
    DuplicateRegistration { service_type: String },

    #[error("Unresolved key: {service_type}")]
    UnresolvedKey { service_type: String },

    #[error("Service {service_type} is request scoped and needs a request context")]
    RequestContextRequired { service_type: String },

    #[error("Circular dependency detected: {path} (cycle at: {cycle_service})")]
    CircularDependency { path: String, cycle_service: String },

    #[error("Type mismatch resolving {service_type}: binding produced {actual}")]
    TypeMismatch { service_type: String, actual: String },

    #[error("Construction failed for '{service_type}': {message}")]
    ServiceConstructionFailed {
        service_type: String,
        message: String,
    },

    #[error("Startup task '{task}' failed: {source}")]
    StartupTaskFailed {
        task: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Bootstrapper is not initialized (state: {state})")]
    NotInitialized { state: String },

    #[error("Bootstrapper is already initialized")]
    AlreadyInitialized,

    #[error("Bootstrapper failed during '{phase}' and must be recreated")]
    BootstrapFailed { phase: String },

    #[error("Invalid bootstrap transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Lock error on resource: {resource}")]
    LockError { resource: String },

    #[error("Invalid service scope: {scope}")]
    InvalidServiceScope { scope: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl CoreError {
    /// Create a new unresolved key error
    pub fn unresolved(service_type: impl Into<String>) -> Self {
        Self::UnresolvedKey {
            service_type: service_type.into(),
        }
    }

    /// Create a new construction failure
    pub fn construction_failed(
        service_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ServiceConstructionFailed {
            service_type: service_type.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Wrap a failure raised by a startup task
    pub fn startup_failed(
        task: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::StartupTaskFailed {
            task: task.into(),
            source: source.into(),
        }
    }

    pub(crate) fn lock(resource: &str) -> Self {
        Self::LockError {
            resource: resource.to_string(),
        }
    }

    /// Check if the error means a capability was never bound
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::UnresolvedKey { .. })
    }

    /// Check if the error is a duplicate registration
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateRegistration { .. })
    }

    /// Check if the error comes from a bootstrapper that never reached ready
    pub fn is_not_initialized(&self) -> bool {
        matches!(self, Self::NotInitialized { .. })
    }

    /// Check if the error is a fatal startup failure
    pub fn is_startup_failure(&self) -> bool {
        matches!(self, Self::StartupTaskFailed { .. })
    }
}

/// API error response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

/// Error shape handed to hosting collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub status: u16,
    pub message: String,
    pub hint: Option<String>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(code: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            status,
            message: message.into(),
            hint: None,
        }
    }

    /// Add a hint to the API error
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<&CoreError> for ApiError {
    fn from(error: &CoreError) -> Self {
        match error {
            CoreError::UnresolvedKey { service_type } => {
                Self::new("NOT_FOUND", 404, format!("No handler bound for {}", service_type))
            }
            CoreError::NotInitialized { .. } | CoreError::BootstrapFailed { .. } => {
                Self::new("SERVICE_UNAVAILABLE", 503, error.to_string())
                    .with_hint("The application did not finish bootstrapping")
            }
            CoreError::RequestContextRequired { .. } => {
                Self::new("SCOPE_ERROR", 500, error.to_string())
            }
            _ => Self::new("INTERNAL_ERROR", 500, error.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        Self::from(&error)
    }
}

impl From<ApiError> for ApiErrorResponse {
    fn from(error: ApiError) -> Self {
        Self { error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_maps_to_not_found() {
        let api: ApiError = CoreError::unresolved("dyn Module(app::Home)").into();
        assert_eq!(api.code, "NOT_FOUND");
        assert_eq!(api.status, 404);
        assert!(api.message.contains("app::Home"));
    }

    #[test]
    fn test_not_initialized_maps_to_unavailable() {
        let error = CoreError::NotInitialized {
            state: "failed".to_string(),
        };
        assert!(error.is_not_initialized());

        let response: ApiErrorResponse = ApiError::from(&error).into();
        assert_eq!(response.error.status, 503);
        assert!(response.error.hint.is_some());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error"]["code"], "SERVICE_UNAVAILABLE");
    }

    #[test]
    fn test_startup_failure_keeps_source() {
        let error = CoreError::startup_failed("MigrateSchema", "schema locked");
        assert!(error.is_startup_failure());
        assert_eq!(
            error.to_string(),
            "Startup task 'MigrateSchema' failed: schema locked"
        );
    }
}
