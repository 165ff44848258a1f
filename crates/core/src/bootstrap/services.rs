//! Infrastructure services the bootstrapper hands to the hosting collaborator.

use crate::errors::CoreError;
use crate::request::{Pipelines, RequestContext};

/// Singleton dispatch service that drives request handling
pub trait Engine: Send + Sync {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn handle_request(&self, context: &RequestContext) -> Result<(), CoreError>;
}

/// Optional diagnostics service, initialized once with the application pipelines
pub trait Diagnostics: Send + Sync {
    fn initialize(&self, pipelines: &mut Pipelines) -> Result<(), CoreError>;
}
