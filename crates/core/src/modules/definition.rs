use std::any::TypeId;

use serde::Serialize;

/// Request handler resolved once per request context.
///
/// Implementations are registered by type and looked up through the
/// [`ModuleCatalog`](crate::modules::ModuleCatalog).
pub trait Module: Send + Sync + 'static {
    /// Stable identifier of the module type
    fn module_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Path prefix the module answers under
    fn module_path(&self) -> &str {
        "/"
    }

    /// Module description
    fn description(&self) -> Option<&'static str> {
        None
    }
}

/// Type identity of a module, used as the secondary key of its binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleType {
    name: &'static str,
    type_id: TypeId,
}

impl ModuleType {
    pub fn of<M: Module>() -> Self {
        Self {
            name: std::any::type_name::<M>(),
            type_id: TypeId::of::<M>(),
        }
    }

    /// Fully-qualified type name of the module
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
}

impl std::fmt::Display for ModuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Module metadata for introspection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleMetadata {
    pub name: String,
    pub path: String,
    pub description: Option<String>,
}

impl ModuleMetadata {
    /// Create metadata from a module
    pub fn from_module<M: Module + ?Sized>(module: &M) -> Self {
        Self {
            name: module.module_name().to_string(),
            path: module.module_path().to_string(),
            description: module.description().map(|d| d.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct UsersModule;

    impl Module for UsersModule {
        fn module_path(&self) -> &str {
            "/users"
        }

        fn description(&self) -> Option<&'static str> {
            Some("user management")
        }
    }

    #[derive(Default)]
    struct HealthModule;

    impl Module for HealthModule {}

    #[test]
    fn test_module_type_identity() {
        let users = ModuleType::of::<UsersModule>();
        assert_eq!(users, ModuleType::of::<UsersModule>());
        assert_ne!(users, ModuleType::of::<HealthModule>());
        assert!(users.name().ends_with("UsersModule"));
        assert_eq!(users.to_string(), users.name());
    }

    #[test]
    fn test_module_name_matches_module_type() {
        assert_eq!(UsersModule.module_name(), ModuleType::of::<UsersModule>().name());
    }

    #[test]
    fn test_metadata_from_module() {
        let metadata = ModuleMetadata::from_module(&UsersModule);
        assert_eq!(metadata.path, "/users");
        assert_eq!(metadata.description.as_deref(), Some("user management"));

        let health = ModuleMetadata::from_module(&HealthModule);
        assert_eq!(health.path, "/");
        assert!(health.description.is_none());
    }
}
