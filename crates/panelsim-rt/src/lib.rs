//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Runtime helpers for the publish loop."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Tick scheduling, cooperative cancellation and the publish loop.

pub mod runner;
pub mod scheduling;

pub use runner::{PanelRunner, RunSummary, StopReason};
pub use scheduling::{shutdown_channel, ShutdownSignal, ShutdownTrigger, TickSchedule};
