//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "01-bootstrap"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Signal model module exports and shared types."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Wind-panel signal model.
//!
//! [`SignalGenerator`] owns a [`SensorState`] and advances it once per tick, producing a
//! [`PanelRecord`] ready to be published. Randomness and the hour of day are injected through
//! [`Entropy`] and [`HourClock`] so runs can be made fully deterministic.

pub mod clock;
pub mod entropy;
pub mod generator;
pub mod record;
pub mod state;
pub mod wind;

pub use clock::{FixedHour, HourClock, LocalClock};
pub use entropy::{Entropy, RandEntropy, StdEntropy};
pub use generator::{
    RandGenerator, SignalGenerator, TickOutcome, FAULT_PROBABILITY, FAULT_TEMPERATURE,
};
pub use record::{Framing, PanelRecord, RecordError, PUBLISHED_HUMIDITY};
pub use state::{ResetReport, SafeRange, SensorState, EXCURSION_THRESHOLD};
pub use wind::WindBand;
