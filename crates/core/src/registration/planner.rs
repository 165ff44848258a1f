use serde::Serialize;

use crate::container::{BindingStore, ServiceScope};
use crate::errors::CoreError;
use crate::registration::types::{
    CollectionTypeRegistration, InstanceRegistration, ModuleRegistration, RegistrationPlan,
    TypeRegistration,
};

/// Number of bindings written by each planner phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub types: usize,
    pub collections: usize,
    pub modules: usize,
    pub instances: usize,
}

impl PlanSummary {
    pub fn total(&self) -> usize {
        self.types + self.collections + self.modules + self.instances
    }
}

/// Applies categorized registrations to a store with the lifetime each
/// category implies.
pub struct RegistrationPlanner<'a> {
    store: &'a mut BindingStore,
}

impl<'a> RegistrationPlanner<'a> {
    pub fn new(store: &'a mut BindingStore) -> Self {
        Self { store }
    }

    /// Bind each type as a singleton
    pub fn register_types(
        &mut self,
        registrations: &[TypeRegistration],
    ) -> Result<usize, CoreError> {
        for registration in registrations {
            self.store.register(
                registration.service_id().clone(),
                registration.implementation().clone(),
                ServiceScope::Singleton,
            )?;
        }
        tracing::debug!(count = registrations.len(), "registered singleton types");
        Ok(registrations.len())
    }

    /// Bind each collection, keeping element order
    pub fn register_collections(
        &mut self,
        registrations: &[CollectionTypeRegistration],
    ) -> Result<usize, CoreError> {
        for registration in registrations {
            self.store.register_collection(
                registration.service_id().clone(),
                registration.implementations().to_vec(),
                registration.element_lifetime(),
            )?;
        }
        tracing::debug!(count = registrations.len(), "registered collections");
        Ok(registrations.len())
    }

    /// Bind each module per request, named by its type
    pub fn register_modules(
        &mut self,
        registrations: &[ModuleRegistration],
    ) -> Result<usize, CoreError> {
        for registration in registrations {
            self.store.register_named(
                registration.module_type().name(),
                registration.implementation().clone(),
                ServiceScope::PerRequestSingleton,
            )?;
        }
        tracing::debug!(count = registrations.len(), "registered modules");
        Ok(registrations.len())
    }

    /// Bind each pre-built instance
    pub fn register_instances(
        &mut self,
        registrations: &[InstanceRegistration],
    ) -> Result<usize, CoreError> {
        for registration in registrations {
            self.store.register(
                registration.service_id().clone(),
                registration.implementation().clone(),
                ServiceScope::Instance,
            )?;
        }
        tracing::debug!(count = registrations.len(), "registered instances");
        Ok(registrations.len())
    }

    /// Run all four phases in order
    pub fn apply(&mut self, plan: &RegistrationPlan) -> Result<PlanSummary, CoreError> {
        Ok(PlanSummary {
            types: self.register_types(&plan.types)?,
            collections: self.register_collections(&plan.collections)?,
            modules: self.register_modules(&plan.modules)?,
            instances: self.register_instances(&plan.instances)?,
        })
    }
}
