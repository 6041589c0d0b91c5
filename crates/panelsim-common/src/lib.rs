//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives for the panel simulator."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Configuration loading and tracing setup consumed across the simulator workspace.

pub mod config;
pub mod logging;

pub use config::{
    AppConfig, BrokerConfig, LoadedAppConfig, LoggingConfig, PublishConfig, SimulationConfig,
};
pub use logging::{init_tracing, LogFormat};
