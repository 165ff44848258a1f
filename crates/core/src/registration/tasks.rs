use crate::registration::types::{
    CollectionTypeRegistration, InstanceRegistration, ModuleRegistration, TypeRegistration,
};
use crate::request::Pipelines;

/// Error returned by a startup task
pub type TaskError = Box<dyn std::error::Error + Send + Sync>;

/// Contributes registrations before the planner runs.
///
/// Tasks are either handed to the bootstrapper builder or bound in the store
/// as a `dyn RegistrationTask` collection by the configure hook.
pub trait RegistrationTask: Send + Sync {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn type_registrations(&self) -> Vec<TypeRegistration> {
        Vec::new()
    }

    fn collection_registrations(&self) -> Vec<CollectionTypeRegistration> {
        Vec::new()
    }

    fn module_registrations(&self) -> Vec<ModuleRegistration> {
        Vec::new()
    }

    fn instance_registrations(&self) -> Vec<InstanceRegistration> {
        Vec::new()
    }
}

/// Runs once during bootstrap, after every registration is applied.
///
/// A failing task aborts the bootstrap.
pub trait StartupTask: Send + Sync {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Add application-wide hooks or perform one-time setup
    fn initialize(&self, pipelines: &mut Pipelines) -> Result<(), TaskError>;
}

impl<F> StartupTask for F
where
    F: Fn(&mut Pipelines) -> Result<(), TaskError> + Send + Sync,
{
    fn initialize(&self, pipelines: &mut Pipelines) -> Result<(), TaskError> {
        self(pipelines)
    }
}
