use std::sync::{Arc, Weak};

use crate::container::BindingStore;
use crate::errors::CoreError;
use crate::modules::{Module, ModuleMetadata, ModuleType};
use crate::request::RequestContext;

/// Request-facing lookup of registered modules.
///
/// Every module is bound as a per-request singleton under `dyn Module`, named
/// by its type, so lookups always go through a request context. The catalog
/// is itself bound in the store it reads from, so it only holds the store
/// weakly; lookups fail once the store has been dropped.
#[derive(Clone)]
pub struct ModuleCatalog {
    store: Weak<BindingStore>,
}

impl std::fmt::Debug for ModuleCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleCatalog")
            .field("modules", &self.module_types())
            .finish()
    }
}

impl ModuleCatalog {
    pub fn new(store: &Arc<BindingStore>) -> Self {
        Self::from_weak(Arc::downgrade(store))
    }

    pub(crate) fn from_weak(store: Weak<BindingStore>) -> Self {
        Self { store }
    }

    fn store(&self) -> Result<Arc<BindingStore>, CoreError> {
        self.store.upgrade().ok_or_else(|| CoreError::NotInitialized {
            state: "released".to_string(),
        })
    }

    /// Resolve the module of `module_type` for this request
    pub fn get_module(
        &self,
        module_type: ModuleType,
        context: &RequestContext,
    ) -> Result<Arc<dyn Module>, CoreError> {
        self.get_module_by_name(module_type.name(), context)
    }

    /// Resolve a module by its fully-qualified type name
    pub fn get_module_by_name(
        &self,
        name: &str,
        context: &RequestContext,
    ) -> Result<Arc<dyn Module>, CoreError> {
        self.store()?.resolve_named::<dyn Module>(name, Some(context))
    }

    /// Resolve every registered module for this request, in registration order
    pub fn get_all_modules(
        &self,
        context: &RequestContext,
    ) -> Result<Vec<Arc<dyn Module>>, CoreError> {
        self.store()?.resolve_named_all::<dyn Module>(Some(context))
    }

    /// Metadata of every module, as seen from `context`
    pub fn metadata(&self, context: &RequestContext) -> Result<Vec<ModuleMetadata>, CoreError> {
        Ok(self
            .get_all_modules(context)?
            .iter()
            .map(|module| ModuleMetadata::from_module(module.as_ref()))
            .collect())
    }

    /// Type names of the registered modules
    pub fn module_types(&self) -> Vec<String> {
        self.store
            .upgrade()
            .map(|store| store.names_of::<dyn Module>())
            .unwrap_or_default()
    }

    pub fn contains(&self, module_type: ModuleType) -> bool {
        self.store
            .upgrade()
            .map(|store| store.contains_named::<dyn Module>(module_type.name()))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.module_types().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
