//! Bootstrap sequencing and lifetime-scoped service resolution.
//!
//! A [`Bootstrapper`] runs once at process start: it populates a
//! [`BindingStore`] with singleton, collection, per-request and instance
//! bindings, runs the startup tasks and becomes ready. Each request then gets
//! its own [`RequestContext`], from which modules and request pipelines are
//! resolved in isolation from every other request.

pub mod bootstrap;
pub mod config;
pub mod container;
pub mod errors;
pub mod logging;
pub mod modules;
pub mod registration;
pub mod request;

pub use bootstrap::{
    ApplicationConfigurator, BootstrapReport, BootstrapState, Bootstrapper, BootstrapperBuilder,
    Diagnostics, Engine,
};
pub use config::{AppConfigTrait, BootstrapConfig, ConfigError, ConfigSource, Environment};
pub use container::{
    BindingStore, DuplicatePolicy, ImplementationDescriptor, Resolver, ServiceId, ServiceScope,
};
pub use errors::{ApiError, ApiErrorResponse, CoreError};
pub use logging::{init_logging, LoggingConfig};
pub use modules::{Module, ModuleCatalog, ModuleType};
pub use registration::{
    CollectionTypeRegistration, InstanceRegistration, ModuleRegistration, RegistrationTask,
    StartupTask, TaskError, TypeRegistration,
};
pub use request::{HookOutcome, Pipelines, RequestContext, RequestStartup};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get crate version
pub fn version() -> &'static str {
    VERSION
}
