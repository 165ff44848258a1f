//! One-shot bootstrap sequence.
//!
//! The [`Bootstrapper`] creates the binding store, lets the application
//! configure it, applies the registration plan, runs the startup tasks and
//! then hands out modules, infrastructure services and request pipelines.

pub mod hooks;
pub mod report;
pub mod sequencer;
pub mod services;
pub mod state;

pub use hooks::{ApplicationConfigurator, DefaultConfigurator};
pub use report::{BootstrapReport, PhaseTiming};
pub use sequencer::{Bootstrapper, BootstrapperBuilder};
pub use services::{Diagnostics, Engine};
pub use state::BootstrapState;
