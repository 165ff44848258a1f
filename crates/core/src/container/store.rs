use std::sync::Arc;

use indexmap::IndexMap;
use uuid::Uuid;

use crate::container::binding::{Binding, CollectionBinding};
use crate::container::construction::ConstructionGraph;
use crate::container::descriptor::{ImplementationDescriptor, ServiceId};
use crate::container::resolver::Resolver;
use crate::container::scope::{DuplicatePolicy, ServiceScope};
use crate::errors::CoreError;
use crate::request::RequestContext;

/// Container of type-to-implementation bindings.
///
/// Bindings are only added through `&mut self`, so once the store is shared
/// behind an `Arc` its binding set is fixed. Resolution still constructs
/// singletons lazily, each guarded by its own once-cell.
pub struct BindingStore {
    store_id: Uuid,
    duplicate_policy: DuplicatePolicy,
    bindings: IndexMap<ServiceId, Binding>,
    collections: IndexMap<ServiceId, CollectionBinding>,
    constructions: ConstructionGraph,
}

impl std::fmt::Debug for BindingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingStore")
            .field("store_id", &self.store_id)
            .field("duplicate_policy", &self.duplicate_policy)
            .field("bindings", &self.bindings.len())
            .field("collections", &self.collections.len())
            .finish()
    }
}

impl Default for BindingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingStore {
    /// Create an empty store where re-registration replaces
    pub fn new() -> Self {
        Self::with_policy(DuplicatePolicy::Replace)
    }

    /// Create an empty store with an explicit duplicate policy
    pub fn with_policy(duplicate_policy: DuplicatePolicy) -> Self {
        Self {
            store_id: Uuid::new_v4(),
            duplicate_policy,
            bindings: IndexMap::new(),
            collections: IndexMap::new(),
            constructions: ConstructionGraph::default(),
        }
    }

    pub fn store_id(&self) -> Uuid {
        self.store_id
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy
    }

    /// Register `implementation` under `service_id` with the given lifetime
    pub fn register(
        &mut self,
        service_id: ServiceId,
        implementation: ImplementationDescriptor,
        lifetime: ServiceScope,
    ) -> Result<&mut Self, CoreError> {
        let binding = Binding::new(service_id.clone(), implementation, lifetime)?;

        if let Some(existing) = self.bindings.get(&service_id) {
            self.check_duplicate(&service_id)?;
            tracing::debug!(
                service = %service_id,
                replaced = existing.implementation().implementation_name(),
                by = binding.implementation().implementation_name(),
                "replacing binding"
            );
        }

        self.bindings.insert(service_id, binding);
        Ok(self)
    }

    /// Register under the descriptor's own capability, unnamed
    pub fn register_descriptor(
        &mut self,
        implementation: ImplementationDescriptor,
        lifetime: ServiceScope,
    ) -> Result<&mut Self, CoreError> {
        let service_id = implementation.key(None);
        self.register(service_id, implementation, lifetime)
    }

    /// Register under the descriptor's capability qualified by `name`
    pub fn register_named(
        &mut self,
        name: impl Into<String>,
        implementation: ImplementationDescriptor,
        lifetime: ServiceScope,
    ) -> Result<&mut Self, CoreError> {
        let service_id = implementation.key(Some(name.into()));
        self.register(service_id, implementation, lifetime)
    }

    /// Register a singleton built by `factory`
    pub fn register_singleton<T, F>(&mut self, factory: F) -> Result<&mut Self, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> Result<Arc<T>, CoreError> + Send + Sync + 'static,
    {
        self.register_descriptor(
            ImplementationDescriptor::new::<T, T, F>(factory),
            ServiceScope::Singleton,
        )
    }

    /// Register a per-request singleton built by `factory`
    pub fn register_per_request<T, F>(&mut self, factory: F) -> Result<&mut Self, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> Result<Arc<T>, CoreError> + Send + Sync + 'static,
    {
        self.register_descriptor(
            ImplementationDescriptor::new::<T, T, F>(factory),
            ServiceScope::PerRequestSingleton,
        )
    }

    /// Register a transient built by `factory`
    pub fn register_transient<T, F>(&mut self, factory: F) -> Result<&mut Self, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> Result<Arc<T>, CoreError> + Send + Sync + 'static,
    {
        self.register_descriptor(
            ImplementationDescriptor::new::<T, T, F>(factory),
            ServiceScope::Transient,
        )
    }

    /// Register a pre-built instance; resolving `T` returns this exact `Arc`
    pub fn register_instance<T>(&mut self, instance: Arc<T>) -> Result<&mut Self, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.register_descriptor(
            ImplementationDescriptor::instance(instance),
            ServiceScope::Instance,
        )
    }

    /// Register the ordered implementations resolved by `resolve_all`
    pub fn register_collection(
        &mut self,
        service_id: ServiceId,
        implementations: Vec<ImplementationDescriptor>,
        element_lifetime: ServiceScope,
    ) -> Result<&mut Self, CoreError> {
        let collection =
            CollectionBinding::new(service_id.clone(), implementations, element_lifetime)?;

        if self.collections.contains_key(&service_id) {
            self.check_duplicate(&service_id)?;
            tracing::debug!(service = %service_id, "replacing collection binding");
        }

        self.collections.insert(service_id, collection);
        Ok(self)
    }

    fn check_duplicate(&self, service_id: &ServiceId) -> Result<(), CoreError> {
        match self.duplicate_policy {
            DuplicatePolicy::Replace => Ok(()),
            DuplicatePolicy::Reject => Err(CoreError::DuplicateRegistration {
                service_type: service_id.to_string(),
            }),
        }
    }

    /// Resolve the unnamed binding of `T`
    pub fn resolve<T>(&self, context: Option<&RequestContext>) -> Result<Arc<T>, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Resolver::new(self, context).resolve::<T>()
    }

    /// Resolve the unnamed binding of `T`, or `None` when nothing is bound to it
    pub fn try_resolve<T>(
        &self,
        context: Option<&RequestContext>,
    ) -> Result<Option<Arc<T>>, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Resolver::new(self, context).try_resolve::<T>()
    }

    /// Resolve the binding of `T` qualified by `name`
    pub fn resolve_named<T>(
        &self,
        name: &str,
        context: Option<&RequestContext>,
    ) -> Result<Arc<T>, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Resolver::new(self, context).resolve_named::<T>(name)
    }

    /// Resolve the collection bound to `T`; empty when none was registered
    pub fn resolve_all<T>(&self, context: Option<&RequestContext>) -> Result<Vec<Arc<T>>, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Resolver::new(self, context).resolve_all::<T>()
    }

    /// Resolve every named binding of `T`, in registration order
    pub fn resolve_named_all<T>(
        &self,
        context: Option<&RequestContext>,
    ) -> Result<Vec<Arc<T>>, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Resolver::new(self, context).resolve_named_all::<T>()
    }

    /// Construct every singleton now instead of on first resolution
    pub fn construct_singletons(&self) -> Result<usize, CoreError> {
        let resolver = Resolver::new(self, None);
        let mut constructed = 0;

        for binding in self.bindings.values().filter(|b| b.lifetime().is_singleton()) {
            resolver.resolve_binding(binding)?;
            constructed += 1;
        }

        for collection in self.collections.values() {
            for element in collection.elements().iter().filter(|b| b.lifetime().is_singleton()) {
                resolver.resolve_binding(element)?;
                constructed += 1;
            }
        }

        Ok(constructed)
    }

    pub(crate) fn constructions(&self) -> &ConstructionGraph {
        &self.constructions
    }

    pub(crate) fn binding(&self, service_id: &ServiceId) -> Option<&Binding> {
        self.bindings.get(service_id)
    }

    pub(crate) fn collection(&self, service_id: &ServiceId) -> Option<&CollectionBinding> {
        self.collections.get(service_id)
    }

    pub(crate) fn named_bindings<T>(&self) -> impl Iterator<Item = &Binding>
    where
        T: ?Sized + 'static,
    {
        self.bindings
            .iter()
            .filter(|(id, _)| id.is_capability::<T>() && id.name.is_some())
            .map(|(_, binding)| binding)
    }

    /// Check if an unnamed binding exists for `T`
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.bindings.contains_key(&ServiceId::of::<T>())
    }

    /// Check if a named binding exists for `T`
    pub fn contains_named<T: ?Sized + 'static>(&self, name: &str) -> bool {
        self.bindings.keys().any(|id| id.matches_named::<T>(name))
    }

    /// Check if a collection is registered for `T`
    pub fn contains_collection<T: ?Sized + 'static>(&self) -> bool {
        self.collections.contains_key(&ServiceId::of::<T>())
    }

    /// Lifetime of the binding registered under `service_id`
    pub fn lifetime_of(&self, service_id: &ServiceId) -> Option<ServiceScope> {
        self.bindings.get(service_id).map(Binding::lifetime)
    }

    /// Keys of all single bindings, in registration order
    pub fn registered_keys(&self) -> Vec<ServiceId> {
        self.bindings.keys().cloned().collect()
    }

    /// Names registered for capability `T`, in registration order
    pub fn names_of<T: ?Sized + 'static>(&self) -> Vec<String> {
        self.bindings
            .keys()
            .filter(|id| id.is_capability::<T>())
            .filter_map(|id| id.name.clone())
            .collect()
    }

    /// Number of single bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Number of collection bindings
    pub fn collection_count(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty() && self.collections.is_empty()
    }
}
