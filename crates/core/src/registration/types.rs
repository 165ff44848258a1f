use std::sync::Arc;

use crate::container::{ImplementationDescriptor, Resolver, ServiceId, ServiceScope};
use crate::errors::CoreError;
use crate::modules::{Module, ModuleType};
use crate::registration::tasks::RegistrationTask;

/// A single singleton binding of a capability
#[derive(Debug, Clone)]
pub struct TypeRegistration {
    service_id: ServiceId,
    implementation: ImplementationDescriptor,
}

impl TypeRegistration {
    /// Bind `implementation` under its own capability
    pub fn new(implementation: ImplementationDescriptor) -> Self {
        Self {
            service_id: implementation.key(None),
            implementation,
        }
    }

    /// Bind `implementation` under its capability qualified by `name`
    pub fn named(name: impl Into<String>, implementation: ImplementationDescriptor) -> Self {
        Self {
            service_id: implementation.key(Some(name.into())),
            implementation,
        }
    }

    pub fn service_id(&self) -> &ServiceId {
        &self.service_id
    }

    pub fn implementation(&self) -> &ImplementationDescriptor {
        &self.implementation
    }
}

/// Several implementations of one capability, resolved together in order
#[derive(Debug, Clone)]
pub struct CollectionTypeRegistration {
    service_id: ServiceId,
    implementations: Vec<ImplementationDescriptor>,
    element_lifetime: ServiceScope,
}

impl CollectionTypeRegistration {
    pub fn new<T: ?Sized + 'static>(implementations: Vec<ImplementationDescriptor>) -> Self {
        Self {
            service_id: ServiceId::of::<T>(),
            implementations,
            element_lifetime: ServiceScope::Singleton,
        }
    }

    /// Lifetime applied to factory-built elements
    pub fn with_element_lifetime(mut self, lifetime: ServiceScope) -> Self {
        self.element_lifetime = lifetime;
        self
    }

    pub fn push(&mut self, implementation: ImplementationDescriptor) -> &mut Self {
        self.implementations.push(implementation);
        self
    }

    pub fn service_id(&self) -> &ServiceId {
        &self.service_id
    }

    pub fn implementations(&self) -> &[ImplementationDescriptor] {
        &self.implementations
    }

    pub fn element_lifetime(&self) -> ServiceScope {
        self.element_lifetime
    }
}

/// A module type and how to build it for each request
#[derive(Debug, Clone)]
pub struct ModuleRegistration {
    module_type: ModuleType,
    implementation: ImplementationDescriptor,
}

impl ModuleRegistration {
    /// Register `M`, built with `Default` for every request
    pub fn of<M: Module + Default>() -> Self {
        Self::with_factory::<M, _>(|_| Ok(M::default()))
    }

    /// Register `M`, built by `factory` for every request
    pub fn with_factory<M, F>(factory: F) -> Self
    where
        M: Module,
        F: Fn(&Resolver<'_>) -> Result<M, CoreError> + Send + Sync + 'static,
    {
        let implementation =
            ImplementationDescriptor::new::<dyn Module, M, _>(move |resolver: &Resolver<'_>| {
                let module = factory(resolver)?;
                Ok(Arc::new(module) as Arc<dyn Module>)
            });

        Self {
            module_type: ModuleType::of::<M>(),
            implementation,
        }
    }

    pub fn module_type(&self) -> ModuleType {
        self.module_type
    }

    pub fn implementation(&self) -> &ImplementationDescriptor {
        &self.implementation
    }
}

/// A pre-built object whose identity is preserved by the store
#[derive(Debug, Clone)]
pub struct InstanceRegistration {
    service_id: ServiceId,
    implementation: ImplementationDescriptor,
}

impl InstanceRegistration {
    pub fn new<T: ?Sized + Send + Sync + 'static>(instance: Arc<T>) -> Self {
        let implementation = ImplementationDescriptor::instance(instance);
        Self {
            service_id: implementation.key(None),
            implementation,
        }
    }

    pub fn named<T: ?Sized + Send + Sync + 'static>(
        name: impl Into<String>,
        instance: Arc<T>,
    ) -> Self {
        let implementation = ImplementationDescriptor::instance(instance);
        Self {
            service_id: implementation.key(Some(name.into())),
            implementation,
        }
    }

    pub fn service_id(&self) -> &ServiceId {
        &self.service_id
    }

    pub fn implementation(&self) -> &ImplementationDescriptor {
        &self.implementation
    }
}

/// The four categorized registration lists applied by the planner
#[derive(Debug, Clone, Default)]
pub struct RegistrationPlan {
    pub types: Vec<TypeRegistration>,
    pub collections: Vec<CollectionTypeRegistration>,
    pub modules: Vec<ModuleRegistration>,
    pub instances: Vec<InstanceRegistration>,
}

impl RegistrationPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append everything `other` contains, keeping order
    pub fn extend(&mut self, other: RegistrationPlan) {
        self.types.extend(other.types);
        self.collections.extend(other.collections);
        self.modules.extend(other.modules);
        self.instances.extend(other.instances);
    }

    /// Append the contribution of a registration task
    pub fn absorb(&mut self, task: &dyn RegistrationTask) {
        self.types.extend(task.type_registrations());
        self.collections.extend(task.collection_registrations());
        self.modules.extend(task.module_registrations());
        self.instances.extend(task.instance_registrations());
    }

    pub fn len(&self) -> usize {
        self.types.len() + self.collections.len() + self.modules.len() + self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
