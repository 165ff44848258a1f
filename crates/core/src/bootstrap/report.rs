use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::bootstrap::BootstrapState;
use crate::registration::PlanSummary;

/// Time spent reaching one bootstrap state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseTiming {
    pub phase: BootstrapState,
    pub elapsed: Duration,
}

/// Statistics for one bootstrap run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BootstrapReport {
    pub registrations: PlanSummary,
    pub registration_task_count: usize,
    pub startup_task_count: usize,
    pub eager_singleton_count: usize,
    pub diagnostics_initialized: bool,
    pub phases: Vec<PhaseTiming>,
    pub total_time: Duration,
    pub completed_at: Option<DateTime<Utc>>,
}

impl BootstrapReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_phase(&mut self, phase: BootstrapState, elapsed: Duration) {
        self.phases.push(PhaseTiming { phase, elapsed });
    }

    /// Time spent reaching `phase`, if it was reached
    pub fn phase_time(&self, phase: BootstrapState) -> Option<Duration> {
        self.phases
            .iter()
            .find(|timing| timing.phase == phase)
            .map(|timing| timing.elapsed)
    }

    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }
}
