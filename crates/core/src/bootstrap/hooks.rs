use crate::container::BindingStore;
use crate::errors::CoreError;
use crate::request::{Pipelines, RequestContext};

/// Application customization points of the bootstrap sequence.
///
/// Every method defaults to doing nothing.
pub trait ApplicationConfigurator: Send + Sync {
    /// Register bindings directly, right after the store is created
    fn configure_store(&self, store: &mut BindingStore) -> Result<(), CoreError> {
        let _ = store;
        Ok(())
    }

    /// Runs once after the startup tasks, with the application pipelines
    fn application_startup(
        &self,
        store: &BindingStore,
        pipelines: &mut Pipelines,
    ) -> Result<(), CoreError> {
        let _ = (store, pipelines);
        Ok(())
    }

    /// Runs for every request after the collection-bound request startups
    fn request_startup(
        &self,
        pipelines: &mut Pipelines,
        context: &RequestContext,
    ) -> Result<(), CoreError> {
        let _ = (pipelines, context);
        Ok(())
    }
}

/// Configurator with no customizations
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultConfigurator;

impl ApplicationConfigurator for DefaultConfigurator {}
