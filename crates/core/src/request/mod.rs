pub mod context;
pub mod pipeline;

pub use context::{RequestContext, ScopeKey};
pub use pipeline::{
    AfterRequestHook, BeforeRequestHook, ErrorHook, HookOutcome, Pipelines,
    RequestPipelineInitializer, RequestStartup,
};
