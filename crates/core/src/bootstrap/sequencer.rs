use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use crate::bootstrap::{
    ApplicationConfigurator, BootstrapReport, BootstrapState, DefaultConfigurator, Diagnostics,
    Engine,
};
use crate::config::{AppConfigTrait, BootstrapConfig, ConfigError};
use crate::container::BindingStore;
use crate::errors::CoreError;
use crate::modules::{Module, ModuleCatalog, ModuleType};
use crate::registration::{
    CollectionTypeRegistration, InstanceRegistration, ModuleRegistration, RegistrationPlan,
    RegistrationPlanner, RegistrationTask, StartupTask, TypeRegistration,
};
use crate::request::{Pipelines, RequestContext, RequestPipelineInitializer, RequestStartup};

type ConfigureFn = Box<dyn Fn(&mut BindingStore) -> Result<(), CoreError> + Send + Sync>;

/// Collects everything the bootstrap sequence needs before it runs
pub struct BootstrapperBuilder {
    config: BootstrapConfig,
    plan: RegistrationPlan,
    registration_tasks: Vec<Arc<dyn RegistrationTask>>,
    startup_tasks: Vec<Arc<dyn StartupTask>>,
    request_startups: Vec<Arc<dyn RequestStartup>>,
    configure: Vec<ConfigureFn>,
    configurator: Arc<dyn ApplicationConfigurator>,
}

impl Default for BootstrapperBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BootstrapperBuilder {
    pub fn new() -> Self {
        Self {
            config: BootstrapConfig::default(),
            plan: RegistrationPlan::new(),
            registration_tasks: Vec::new(),
            startup_tasks: Vec::new(),
            request_startups: Vec::new(),
            configure: Vec::new(),
            configurator: Arc::new(DefaultConfigurator),
        }
    }

    /// Start from configuration read from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new().with_config(BootstrapConfig::from_env()?))
    }

    pub fn with_config(mut self, config: BootstrapConfig) -> Self {
        self.config = config;
        self
    }

    pub fn register_type(mut self, registration: TypeRegistration) -> Self {
        self.plan.types.push(registration);
        self
    }

    pub fn register_collection(mut self, registration: CollectionTypeRegistration) -> Self {
        self.plan.collections.push(registration);
        self
    }

    pub fn register_module(mut self, registration: ModuleRegistration) -> Self {
        self.plan.modules.push(registration);
        self
    }

    /// Register module `M`, built with `Default` per request
    pub fn module<M: Module + Default>(self) -> Self {
        self.register_module(ModuleRegistration::of::<M>())
    }

    pub fn register_instance(mut self, registration: InstanceRegistration) -> Self {
        self.plan.instances.push(registration);
        self
    }

    pub fn registration_task<T: RegistrationTask + 'static>(mut self, task: T) -> Self {
        self.registration_tasks.push(Arc::new(task));
        self
    }

    pub fn startup_task<T: StartupTask + 'static>(mut self, task: T) -> Self {
        self.startup_tasks.push(Arc::new(task));
        self
    }

    pub fn request_startup<R: RequestStartup + 'static>(mut self, startup: R) -> Self {
        self.request_startups.push(Arc::new(startup));
        self
    }

    /// Register bindings directly; runs after the configurator's `configure_store`
    pub fn configure<F>(mut self, configure: F) -> Self
    where
        F: Fn(&mut BindingStore) -> Result<(), CoreError> + Send + Sync + 'static,
    {
        self.configure.push(Box::new(configure));
        self
    }

    pub fn configurator<C: ApplicationConfigurator + 'static>(mut self, configurator: C) -> Self {
        self.configurator = Arc::new(configurator);
        self
    }

    pub fn build(self) -> Bootstrapper {
        Bootstrapper {
            config: self.config,
            plan: self.plan,
            registration_tasks: self.registration_tasks,
            startup_tasks: self.startup_tasks,
            request_startups: self.request_startups,
            configure: self.configure,
            configurator: self.configurator,
            state: BootstrapState::Uninitialized,
            failed_phase: None,
            store: None,
            catalog: None,
            application_pipelines: Pipelines::new(),
            report: BootstrapReport::new(),
        }
    }
}

/// Runs the one-shot bootstrap sequence and then serves resolutions.
///
/// `initialize` either reaches `Ready` or leaves the bootstrapper `Failed`;
/// a failed bootstrapper is never resumed and must be rebuilt. Every
/// resolution method returns `NotInitialized` until `Ready`.
pub struct Bootstrapper {
    config: BootstrapConfig,
    plan: RegistrationPlan,
    registration_tasks: Vec<Arc<dyn RegistrationTask>>,
    startup_tasks: Vec<Arc<dyn StartupTask>>,
    request_startups: Vec<Arc<dyn RequestStartup>>,
    configure: Vec<ConfigureFn>,
    configurator: Arc<dyn ApplicationConfigurator>,
    state: BootstrapState,
    failed_phase: Option<BootstrapState>,
    store: Option<Arc<BindingStore>>,
    catalog: Option<ModuleCatalog>,
    application_pipelines: Pipelines,
    report: BootstrapReport,
}

impl std::fmt::Debug for Bootstrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bootstrapper")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("store", &self.store)
            .finish()
    }
}

impl Bootstrapper {
    pub fn builder() -> BootstrapperBuilder {
        BootstrapperBuilder::new()
    }

    /// Run the bootstrap sequence once
    pub fn initialize(&mut self) -> Result<(), CoreError> {
        match self.state {
            BootstrapState::Uninitialized => {}
            BootstrapState::Ready => return Err(CoreError::AlreadyInitialized),
            BootstrapState::Failed => {
                return Err(CoreError::BootstrapFailed {
                    phase: self.failed_phase.unwrap_or(BootstrapState::Failed).to_string(),
                })
            }
            other => {
                return Err(CoreError::InvalidStateTransition {
                    from: other.to_string(),
                    to: BootstrapState::StoreCreated.to_string(),
                })
            }
        }

        let started = Instant::now();
        tracing::info!(
            environment = %self.config.environment,
            duplicate_policy = %self.config.duplicate_policy,
            "starting bootstrap"
        );

        match self.run_sequence() {
            Ok((store, catalog, pipelines)) => {
                self.catalog = Some(catalog);
                self.store = Some(store);
                self.application_pipelines = pipelines;

                let phase_start = Instant::now();
                self.advance(BootstrapState::Ready, phase_start)?;
                self.report.total_time = started.elapsed();
                self.report.completed_at = Some(Utc::now());

                tracing::info!(
                    bindings = self.store.as_ref().map(|s| s.len()).unwrap_or(0),
                    modules = self.report.registrations.modules,
                    startup_tasks = self.report.startup_task_count,
                    elapsed = ?self.report.total_time,
                    "bootstrap completed"
                );
                Ok(())
            }
            Err(error) => {
                let phase = self.state.next().unwrap_or(self.state);
                self.state = BootstrapState::Failed;
                self.failed_phase = Some(phase);
                self.report.total_time = started.elapsed();
                tracing::error!(phase = %phase, error = %error, "bootstrap failed");
                Err(error)
            }
        }
    }

    fn run_sequence(&mut self) -> Result<(Arc<BindingStore>, ModuleCatalog, Pipelines), CoreError> {
        let mut phase_start = Instant::now();

        let mut store = BindingStore::with_policy(self.config.duplicate_policy);
        phase_start = self.advance(BootstrapState::StoreCreated, phase_start)?;

        self.configurator.configure_store(&mut store)?;
        for configure in &self.configure {
            configure(&mut store)?;
        }
        phase_start = self.advance(BootstrapState::UserConfigured, phase_start)?;

        let plan = self.collect_plan(&store)?;
        let mut planner = RegistrationPlanner::new(&mut store);

        self.report.registrations.types = planner.register_types(&plan.types)?;
        phase_start = self.advance(BootstrapState::TypesRegistered, phase_start)?;

        self.report.registrations.collections = planner.register_collections(&plan.collections)?;
        phase_start = self.advance(BootstrapState::CollectionsRegistered, phase_start)?;

        self.report.registrations.modules = planner.register_modules(&plan.modules)?;
        phase_start = self.advance(BootstrapState::ModulesRegistered, phase_start)?;

        self.report.registrations.instances = planner.register_instances(&plan.instances)?;
        let (store, catalog) = Self::bind_catalog(store)?;
        phase_start = self.advance(BootstrapState::InstancesRegistered, phase_start)?;

        let pipelines = self.run_startup(&store)?;
        self.advance(BootstrapState::StartupTasksExecuted, phase_start)?;

        if self.config.eager_singletons {
            self.report.eager_singleton_count = store.construct_singletons()?;
            tracing::debug!(
                count = self.report.eager_singleton_count,
                "constructed singletons eagerly"
            );
        }

        Ok((store, catalog, pipelines))
    }

    /// Share the store and bind the module catalog into it, after every other registration
    fn bind_catalog(
        mut store: BindingStore,
    ) -> Result<(Arc<BindingStore>, ModuleCatalog), CoreError> {
        let mut registered = Ok(());
        let store = Arc::new_cyclic(|weak| {
            let catalog = Arc::new(ModuleCatalog::from_weak(weak.clone()));
            registered = store.register_instance(catalog).map(|_| ());
            store
        });
        registered?;

        let catalog = ModuleCatalog::new(&store);
        Ok((store, catalog))
    }

    /// Builder lists, then store-bound registration tasks, then builder tasks
    fn collect_plan(&mut self, store: &BindingStore) -> Result<RegistrationPlan, CoreError> {
        let mut plan = self.plan.clone();
        let discovered = store.resolve_all::<dyn RegistrationTask>(None)?;

        for task in discovered.iter().chain(self.registration_tasks.iter()) {
            tracing::debug!(task = task.name(), "collecting registrations");
            plan.absorb(task.as_ref());
        }

        self.report.registration_task_count = discovered.len() + self.registration_tasks.len();
        Ok(plan)
    }

    fn run_startup(&mut self, store: &BindingStore) -> Result<Pipelines, CoreError> {
        let mut pipelines = Pipelines::new();
        let discovered = store.resolve_all::<dyn StartupTask>(None)?;

        for task in discovered.iter().chain(self.startup_tasks.iter()) {
            tracing::debug!(task = task.name(), "running startup task");
            task.initialize(&mut pipelines)
                .map_err(|e| CoreError::startup_failed(task.name(), e))?;
        }
        self.report.startup_task_count = discovered.len() + self.startup_tasks.len();

        self.configurator
            .application_startup(store, &mut pipelines)
            .map_err(|e| CoreError::startup_failed("application_startup", e))?;

        match store.resolve::<dyn Diagnostics>(None) {
            Ok(diagnostics) => {
                diagnostics
                    .initialize(&mut pipelines)
                    .map_err(|e| CoreError::startup_failed("diagnostics", e))?;
                self.report.diagnostics_initialized = true;
            }
            Err(e) if e.is_unresolved() && !self.config.require_diagnostics => {
                tracing::debug!("no diagnostics service bound");
            }
            Err(e) => return Err(CoreError::startup_failed("diagnostics", e)),
        }

        Ok(pipelines)
    }

    fn advance(&mut self, to: BootstrapState, phase_start: Instant) -> Result<Instant, CoreError> {
        self.state = self.state.advance_to(to)?;
        self.report.record_phase(to, phase_start.elapsed());
        tracing::debug!(state = %to, "bootstrap state advanced");
        Ok(Instant::now())
    }

    pub fn state(&self) -> BootstrapState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == BootstrapState::Ready
    }

    pub fn report(&self) -> &BootstrapReport {
        &self.report
    }

    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    fn ready_store(&self) -> Result<&Arc<BindingStore>, CoreError> {
        match (&self.store, self.state) {
            (Some(store), BootstrapState::Ready) => Ok(store),
            _ => Err(CoreError::NotInitialized {
                state: self.state.to_string(),
            }),
        }
    }

    fn ready_catalog(&self) -> Result<&ModuleCatalog, CoreError> {
        self.ready_store()?;
        self.catalog.as_ref().ok_or_else(|| CoreError::NotInitialized {
            state: self.state.to_string(),
        })
    }

    /// The populated store, for collaborator-specific resolutions
    pub fn store(&self) -> Result<Arc<BindingStore>, CoreError> {
        self.ready_store().cloned()
    }

    /// Hooks added by the startup tasks, shared by every request
    pub fn application_pipelines(&self) -> Result<&Pipelines, CoreError> {
        self.ready_store()?;
        Ok(&self.application_pipelines)
    }

    pub fn get_engine(&self) -> Result<Arc<dyn Engine>, CoreError> {
        self.ready_store()?.resolve::<dyn Engine>(None)
    }

    pub fn get_diagnostics(&self) -> Result<Arc<dyn Diagnostics>, CoreError> {
        self.ready_store()?.resolve::<dyn Diagnostics>(None)
    }

    pub fn module_catalog(&self) -> Result<ModuleCatalog, CoreError> {
        self.ready_catalog().cloned()
    }

    pub fn get_module(
        &self,
        module_type: ModuleType,
        context: &RequestContext,
    ) -> Result<Arc<dyn Module>, CoreError> {
        self.ready_catalog()?.get_module(module_type, context)
    }

    pub fn get_module_by_name(
        &self,
        name: &str,
        context: &RequestContext,
    ) -> Result<Arc<dyn Module>, CoreError> {
        self.ready_catalog()?.get_module_by_name(name, context)
    }

    pub fn get_all_modules(
        &self,
        context: &RequestContext,
    ) -> Result<Vec<Arc<dyn Module>>, CoreError> {
        self.ready_catalog()?.get_all_modules(context)
    }

    /// Build the pipelines for one request
    pub fn initialize_request_pipeline(
        &self,
        context: &RequestContext,
    ) -> Result<Pipelines, CoreError> {
        let store = self.ready_store()?;
        let mut pipelines = RequestPipelineInitializer::new(store, &self.application_pipelines)
            .initialize(context)?;

        for startup in &self.request_startups {
            startup.initialize(&mut pipelines, context)?;
        }
        self.configurator.request_startup(&mut pipelines, context)?;

        tracing::trace!(
            request_id = %context.id(),
            hooks = pipelines.hook_count(),
            "request pipeline initialized"
        );
        Ok(pipelines)
    }

    /// Create a request context once the bootstrapper is ready
    pub fn begin_request(&self) -> Result<RequestContext, CoreError> {
        self.ready_store()?;
        let context = RequestContext::new();
        tracing::trace!(request_id = %context.id(), "request started");
        Ok(context)
    }
}
