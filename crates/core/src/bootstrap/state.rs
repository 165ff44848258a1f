use serde::Serialize;

use crate::errors::CoreError;

/// Bootstrap sequence states, in the only order they may be entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapState {
    Uninitialized,
    StoreCreated,
    UserConfigured,
    TypesRegistered,
    CollectionsRegistered,
    ModulesRegistered,
    InstancesRegistered,
    StartupTasksExecuted,
    Ready,
    Failed,
}

impl BootstrapState {
    /// The state that follows this one; `None` for `Ready` and `Failed`
    pub fn next(&self) -> Option<BootstrapState> {
        use BootstrapState::*;
        match self {
            Uninitialized => Some(StoreCreated),
            StoreCreated => Some(UserConfigured),
            UserConfigured => Some(TypesRegistered),
            TypesRegistered => Some(CollectionsRegistered),
            CollectionsRegistered => Some(ModulesRegistered),
            ModulesRegistered => Some(InstancesRegistered),
            InstancesRegistered => Some(StartupTasksExecuted),
            StartupTasksExecuted => Some(Ready),
            Ready | Failed => None,
        }
    }

    /// Move to `to`, which must be the next state
    pub fn advance_to(&self, to: BootstrapState) -> Result<BootstrapState, CoreError> {
        if self.next() == Some(to) {
            Ok(to)
        } else {
            Err(CoreError::InvalidStateTransition {
                from: self.to_string(),
                to: to.to_string(),
            })
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BootstrapState::Ready | BootstrapState::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BootstrapState::Uninitialized => "uninitialized",
            BootstrapState::StoreCreated => "store_created",
            BootstrapState::UserConfigured => "user_configured",
            BootstrapState::TypesRegistered => "types_registered",
            BootstrapState::CollectionsRegistered => "collections_registered",
            BootstrapState::ModulesRegistered => "modules_registered",
            BootstrapState::InstancesRegistered => "instances_registered",
            BootstrapState::StartupTasksExecuted => "startup_tasks_executed",
            BootstrapState::Ready => "ready",
            BootstrapState::Failed => "failed",
        }
    }
}

impl Default for BootstrapState {
    fn default() -> Self {
        BootstrapState::Uninitialized
    }
}

impl std::fmt::Display for BootstrapState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
