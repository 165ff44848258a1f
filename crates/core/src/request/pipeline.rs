//! Request pipelines: the ordered before/after/error hooks attached to a request.
//!
//! Application-wide hooks are added by startup tasks once, during bootstrap.
//! Each request gets a copy of them, followed by the hooks bound in the
//! store (the standalone binding of each hook trait, then its collection),
//! and finally whatever the request startups add.

use std::sync::Arc;

use crate::container::BindingStore;
use crate::errors::CoreError;
use crate::request::RequestContext;

/// Result of a before-request hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    /// Keep processing the request
    Continue,
    /// Stop processing; the host answers without dispatching to a module
    Halt { reason: String },
}

impl HookOutcome {
    pub fn halt(reason: impl Into<String>) -> Self {
        HookOutcome::Halt {
            reason: reason.into(),
        }
    }

    pub fn is_halt(&self) -> bool {
        matches!(self, HookOutcome::Halt { .. })
    }
}

/// Hook run before the request is dispatched
pub trait BeforeRequestHook: Send + Sync {
    fn before_request(&self, context: &RequestContext) -> Result<HookOutcome, CoreError>;
}

/// Hook run after the request was handled
pub trait AfterRequestHook: Send + Sync {
    fn after_request(&self, context: &RequestContext) -> Result<(), CoreError>;
}

/// Hook run when handling the request failed
pub trait ErrorHook: Send + Sync {
    fn on_error(&self, context: &RequestContext, error: &CoreError) -> Result<(), CoreError>;
}

/// Per-request initialization that may add hooks for one request
pub trait RequestStartup: Send + Sync {
    fn initialize(
        &self,
        pipelines: &mut Pipelines,
        context: &RequestContext,
    ) -> Result<(), CoreError>;
}

impl<F> BeforeRequestHook for F
where
    F: Fn(&RequestContext) -> Result<HookOutcome, CoreError> + Send + Sync,
{
    fn before_request(&self, context: &RequestContext) -> Result<HookOutcome, CoreError> {
        self(context)
    }
}

impl<F> AfterRequestHook for F
where
    F: Fn(&RequestContext) -> Result<(), CoreError> + Send + Sync,
{
    fn after_request(&self, context: &RequestContext) -> Result<(), CoreError> {
        self(context)
    }
}

impl<F> ErrorHook for F
where
    F: Fn(&RequestContext, &CoreError) -> Result<(), CoreError> + Send + Sync,
{
    fn on_error(&self, context: &RequestContext, error: &CoreError) -> Result<(), CoreError> {
        self(context, error)
    }
}

/// Ordered hook lists for one scope (application-wide or one request)
#[derive(Clone, Default)]
pub struct Pipelines {
    before_request: Vec<Arc<dyn BeforeRequestHook>>,
    after_request: Vec<Arc<dyn AfterRequestHook>>,
    on_error: Vec<Arc<dyn ErrorHook>>,
}

impl std::fmt::Debug for Pipelines {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipelines")
            .field("before_request", &self.before_request.len())
            .field("after_request", &self.after_request.len())
            .field("on_error", &self.on_error.len())
            .finish()
    }
}

impl Pipelines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_before<H: BeforeRequestHook + 'static>(&mut self, hook: H) -> &mut Self {
        self.before_request.push(Arc::new(hook));
        self
    }

    pub fn add_after<H: AfterRequestHook + 'static>(&mut self, hook: H) -> &mut Self {
        self.after_request.push(Arc::new(hook));
        self
    }

    pub fn add_on_error<H: ErrorHook + 'static>(&mut self, hook: H) -> &mut Self {
        self.on_error.push(Arc::new(hook));
        self
    }

    pub fn before_request(&self) -> &[Arc<dyn BeforeRequestHook>] {
        &self.before_request
    }

    pub fn after_request(&self) -> &[Arc<dyn AfterRequestHook>] {
        &self.after_request
    }

    pub fn on_error(&self) -> &[Arc<dyn ErrorHook>] {
        &self.on_error
    }

    /// Total number of hooks across all three stages
    pub fn hook_count(&self) -> usize {
        self.before_request.len() + self.after_request.len() + self.on_error.len()
    }

    /// Run before-request hooks in order, stopping at the first halt
    pub fn invoke_before(&self, context: &RequestContext) -> Result<HookOutcome, CoreError> {
        for hook in &self.before_request {
            let outcome = hook.before_request(context)?;
            if outcome.is_halt() {
                tracing::debug!(request_id = %context.id(), ?outcome, "before-request hook halted");
                return Ok(outcome);
            }
        }
        Ok(HookOutcome::Continue)
    }

    /// Run after-request hooks in order
    pub fn invoke_after(&self, context: &RequestContext) -> Result<(), CoreError> {
        for hook in &self.after_request {
            hook.after_request(context)?;
        }
        Ok(())
    }

    /// Run error hooks in order
    pub fn invoke_error(
        &self,
        context: &RequestContext,
        error: &CoreError,
    ) -> Result<(), CoreError> {
        for hook in &self.on_error {
            hook.on_error(context, error)?;
        }
        Ok(())
    }

    fn extend_from_store(
        &mut self,
        store: &BindingStore,
        context: &RequestContext,
    ) -> Result<(), CoreError> {
        let context = Some(context);
        self.before_request.extend(store.try_resolve::<dyn BeforeRequestHook>(context)?);
        self.before_request.extend(store.resolve_all::<dyn BeforeRequestHook>(context)?);
        self.after_request.extend(store.try_resolve::<dyn AfterRequestHook>(context)?);
        self.after_request.extend(store.resolve_all::<dyn AfterRequestHook>(context)?);
        self.on_error.extend(store.try_resolve::<dyn ErrorHook>(context)?);
        self.on_error.extend(store.resolve_all::<dyn ErrorHook>(context)?);
        Ok(())
    }
}

/// Builds the pipelines attached to one request context
pub struct RequestPipelineInitializer<'a> {
    store: &'a BindingStore,
    application: &'a Pipelines,
}

impl<'a> RequestPipelineInitializer<'a> {
    pub fn new(store: &'a BindingStore, application: &'a Pipelines) -> Self {
        Self { store, application }
    }

    /// Application hooks, then store-bound hooks, then request startups
    pub fn initialize(&self, context: &RequestContext) -> Result<Pipelines, CoreError> {
        let mut pipelines = self.application.clone();
        pipelines.extend_from_store(self.store, context)?;

        for startup in self.store.resolve_all::<dyn RequestStartup>(Some(context))? {
            startup.initialize(&mut pipelines, context)?;
        }

        Ok(pipelines)
    }
}
