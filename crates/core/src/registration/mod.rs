//! Registration inputs and the planner that applies them to a store.

pub mod planner;
pub mod tasks;
pub mod types;

pub use planner::{PlanSummary, RegistrationPlanner};
pub use tasks::{RegistrationTask, StartupTask, TaskError};
pub use types::{
    CollectionTypeRegistration, InstanceRegistration, ModuleRegistration, RegistrationPlan,
    TypeRegistration,
};
