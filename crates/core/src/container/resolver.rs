use std::sync::Arc;

use crate::container::binding::{Binding, BindingKey};
use crate::container::descriptor::{downcast_instance, AnyInstance, ServiceId};
use crate::container::store::BindingStore;
use crate::errors::CoreError;
use crate::request::RequestContext;

/// Resolution handle passed to factories.
///
/// Carries the store, the optional request context and the chain of bindings
/// currently under construction, so a factory can resolve its own
/// dependencies in the same scope. A binding reached twice on one chain is
/// reported as a cycle. Cycles split across threads that first-construct
/// singletons concurrently are caught by the store's construction graph.
pub struct Resolver<'a> {
    store: &'a BindingStore,
    context: Option<&'a RequestContext>,
    path: Vec<BindingKey>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(store: &'a BindingStore, context: Option<&'a RequestContext>) -> Self {
        Self {
            store,
            context,
            path: Vec::new(),
        }
    }

    /// The store resolutions are served from
    pub fn store(&self) -> &'a BindingStore {
        self.store
    }

    /// The request context of this resolution, if any
    pub fn context(&self) -> Option<&'a RequestContext> {
        self.context
    }

    /// Bindings currently being constructed, outermost first
    pub fn path(&self) -> &[BindingKey] {
        &self.path
    }

    /// Resolve the unnamed binding of capability `T`
    pub fn resolve<T>(&self) -> Result<Arc<T>, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolve_id::<T>(&ServiceId::of::<T>())
    }

    /// Resolve the binding of capability `T` registered under `name`
    pub fn resolve_named<T>(&self, name: &str) -> Result<Arc<T>, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolve_id::<T>(&ServiceId::named::<T>(name))
    }

    /// Resolve `T`, mapping an unbound key to `None`
    pub fn try_resolve<T>(&self) -> Result<Option<Arc<T>>, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        // Only the key itself may be missing; a missing dependency is still an error
        if !self.store.contains::<T>() {
            return Ok(None);
        }
        self.resolve::<T>().map(Some)
    }

    /// Resolve every element of the collection bound to `T`, in order
    pub fn resolve_all<T>(&self) -> Result<Vec<Arc<T>>, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let service_id = ServiceId::of::<T>();
        let collection = match self.store.collection(&service_id) {
            Some(collection) => collection,
            None => return Ok(Vec::new()),
        };

        collection
            .elements()
            .iter()
            .map(|element| {
                let instance = self.resolve_binding(element)?;
                downcast_instance::<T>(&instance, &service_id)
            })
            .collect()
    }

    /// Resolve every named binding of capability `T`, in registration order
    pub fn resolve_named_all<T>(&self) -> Result<Vec<Arc<T>>, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.store
            .named_bindings::<T>()
            .map(|binding| {
                let instance = self.resolve_binding(binding)?;
                downcast_instance::<T>(&instance, binding.service_id())
            })
            .collect()
    }

    /// Same store and path, detached from any request context
    pub(crate) fn without_context(&self) -> Resolver<'a> {
        Resolver {
            store: self.store,
            context: None,
            path: self.path.clone(),
        }
    }

    pub(crate) fn resolve_id<T>(&self, service_id: &ServiceId) -> Result<Arc<T>, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let binding = self
            .store
            .binding(service_id)
            .ok_or_else(|| CoreError::unresolved(service_id.to_string()))?;
        let instance = self.resolve_binding(binding)?;
        downcast_instance::<T>(&instance, service_id)
    }

    pub(crate) fn resolve_binding(&self, binding: &Binding) -> Result<AnyInstance, CoreError> {
        let scope = self.enter(binding.key())?;
        binding.resolve_erased(&scope)
    }

    fn enter(&self, key: BindingKey) -> Result<Resolver<'a>, CoreError> {
        if self.path.contains(&key) {
            let path = self
                .path
                .iter()
                .chain(std::iter::once(&key))
                .map(|key| key.to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(CoreError::CircularDependency {
                path,
                cycle_service: key.to_string(),
            });
        }

        let mut path = self.path.clone();
        path.push(key);
        Ok(Resolver {
            store: self.store,
            context: self.context,
            path,
        })
    }
}
