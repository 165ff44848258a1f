use once_cell::sync::OnceCell;

use crate::container::descriptor::{AnyInstance, ImplementationDescriptor, ServiceId};
use crate::container::resolver::Resolver;
use crate::container::scope::ServiceScope;
use crate::errors::CoreError;
use crate::request::ScopeKey;

/// Identity of one binding: its key plus its position inside a collection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindingKey {
    pub service_id: ServiceId,
    pub slot: Option<usize>,
}

impl std::fmt::Display for BindingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.slot {
            Some(slot) => write!(f, "{}[{}]", self.service_id, slot),
            None => write!(f, "{}", self.service_id),
        }
    }
}

/// One live association between a key, an implementation and a lifetime policy
pub struct Binding {
    service_id: ServiceId,
    implementation: ImplementationDescriptor,
    lifetime: ServiceScope,
    slot: Option<usize>,
    singleton: OnceCell<AnyInstance>,
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("service_id", &self.service_id)
            .field("implementation", &self.implementation.implementation_name())
            .field("lifetime", &self.lifetime)
            .field("slot", &self.slot)
            .field("constructed", &self.singleton.get().is_some())
            .finish()
    }
}

impl Binding {
    /// Create a binding, checking that the implementation serves the key's capability
    pub fn new(
        service_id: ServiceId,
        implementation: ImplementationDescriptor,
        lifetime: ServiceScope,
    ) -> Result<Self, CoreError> {
        if implementation.capability_id() != service_id.type_id {
            return Err(CoreError::TypeMismatch {
                service_type: service_id.to_string(),
                actual: implementation.capability_name().to_string(),
            });
        }

        // Pre-built instances keep their identity whatever policy was asked for.
        let lifetime = match (implementation.is_instance(), lifetime) {
            (true, _) => ServiceScope::Instance,
            (false, ServiceScope::Instance) => {
                return Err(CoreError::configuration(format!(
                    "{} uses the instance lifetime but has no pre-built instance",
                    service_id
                )));
            }
            (false, lifetime) => lifetime,
        };

        Ok(Self {
            service_id,
            implementation,
            lifetime,
            slot: None,
            singleton: OnceCell::new(),
        })
    }

    fn in_slot(mut self, slot: usize) -> Self {
        self.slot = Some(slot);
        self
    }

    pub fn service_id(&self) -> &ServiceId {
        &self.service_id
    }

    /// Position inside the owning collection, `None` for standalone bindings
    pub fn slot(&self) -> Option<usize> {
        self.slot
    }

    pub fn key(&self) -> BindingKey {
        BindingKey {
            service_id: self.service_id.clone(),
            slot: self.slot,
        }
    }

    pub fn implementation(&self) -> &ImplementationDescriptor {
        &self.implementation
    }

    pub fn lifetime(&self) -> ServiceScope {
        self.lifetime
    }

    /// Whether a singleton instance has been built yet
    pub fn is_constructed(&self) -> bool {
        self.singleton.get().is_some()
    }

    /// Produce the erased instance according to the lifetime policy
    pub(crate) fn resolve_erased(&self, resolver: &Resolver<'_>) -> Result<AnyInstance, CoreError> {
        match self.lifetime {
            ServiceScope::Instance | ServiceScope::Transient => {
                self.implementation.activate(resolver)
            }
            ServiceScope::Singleton => {
                if let Some(instance) = self.singleton.get() {
                    return Ok(instance.clone());
                }

                let key = self.key();
                let constructions = resolver.store().constructions();
                let _waiting = constructions.wait_for(&key)?;
                self.singleton
                    .get_or_try_init(|| {
                        let _constructing = constructions.begin(&key)?;
                        tracing::debug!(
                            service = %self.service_id,
                            implementation = self.implementation.implementation_name(),
                            "constructing singleton"
                        );
                        // Singletons never see the request that first resolved them
                        self.implementation.activate(&resolver.without_context())
                    })
                    .cloned()
            }
            ServiceScope::PerRequestSingleton => {
                let context = resolver.context().ok_or_else(|| CoreError::RequestContextRequired {
                    service_type: self.service_id.to_string(),
                })?;
                let key = ScopeKey {
                    store_id: resolver.store().store_id(),
                    service_id: self.service_id.clone(),
                    slot: self.slot,
                };
                context.get_or_create_scoped(key, || self.implementation.activate(resolver))
            }
        }
    }
}

/// Ordered implementations resolved together as "all implementations of a capability"
#[derive(Debug)]
pub struct CollectionBinding {
    service_id: ServiceId,
    elements: Vec<Binding>,
}

impl CollectionBinding {
    /// Build a collection; factory elements get `element_lifetime`, instances keep identity
    pub fn new(
        service_id: ServiceId,
        implementations: Vec<ImplementationDescriptor>,
        element_lifetime: ServiceScope,
    ) -> Result<Self, CoreError> {
        let elements = implementations
            .into_iter()
            .enumerate()
            .map(|(slot, implementation)| {
                let lifetime = if implementation.is_instance() {
                    ServiceScope::Instance
                } else {
                    element_lifetime
                };
                Binding::new(service_id.clone(), implementation, lifetime).map(|b| b.in_slot(slot))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { service_id, elements })
    }

    pub fn service_id(&self) -> &ServiceId {
        &self.service_id
    }

    pub fn elements(&self) -> &[Binding] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Default)]
    struct Clock;

    #[test]
    fn test_instance_descriptor_forces_instance_lifetime() {
        let binding = Binding::new(
            ServiceId::of::<Clock>(),
            ImplementationDescriptor::instance(Arc::new(Clock)),
            ServiceScope::Singleton,
        )
        .unwrap();

        assert_eq!(binding.lifetime(), ServiceScope::Instance);
    }

    #[test]
    fn test_factory_cannot_use_instance_lifetime() {
        let result = Binding::new(
            ServiceId::of::<Clock>(),
            ImplementationDescriptor::of_default::<Clock>(),
            ServiceScope::Instance,
        );

        assert!(matches!(result, Err(CoreError::Configuration { .. })));
    }

    #[test]
    fn test_capability_mismatch_is_rejected() {
        let result = Binding::new(
            ServiceId::of::<String>(),
            ImplementationDescriptor::of_default::<Clock>(),
            ServiceScope::Singleton,
        );

        assert!(matches!(result, Err(CoreError::TypeMismatch { .. })));
    }

    #[test]
    fn test_collection_assigns_slots_in_order() {
        let collection = CollectionBinding::new(
            ServiceId::of::<Clock>(),
            vec![
                ImplementationDescriptor::of_default::<Clock>(),
                ImplementationDescriptor::instance(Arc::new(Clock)),
            ],
            ServiceScope::Transient,
        )
        .unwrap();

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.elements()[0].slot, Some(0));
        assert_eq!(collection.elements()[0].lifetime(), ServiceScope::Transient);
        assert_eq!(collection.elements()[1].slot, Some(1));
        assert_eq!(collection.elements()[1].lifetime(), ServiceScope::Instance);
    }
}
