//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Signal generator advancing the panel state once per tick."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::ops::Range;

use tracing::debug;

use crate::clock::HourClock;
use crate::entropy::{Entropy, RandEntropy, StdEntropy};
use crate::record::PanelRecord;
use crate::state::{ResetReport, SensorState};
use crate::wind::{smooth_toward, WindBand};

pub const NOMINAL_VOLTAGE_AC: f64 = 220.0;
pub const NOMINAL_CURRENT_AC: f64 = 1.5;
const VOLTAGE_AC_JITTER: Range<f64> = -1.5..1.5;
const CURRENT_AC_JITTER: Range<f64> = -0.2..0.2;
const TEMPERATURE_STEP: Range<f64> = -0.2..0.2;

/// Chance per tick of a simulated over-temperature fault.
pub const FAULT_PROBABILITY: f64 = 0.05;
/// Range a fault temperature is drawn from before rounding to one decimal.
pub const FAULT_TEMPERATURE: Range<f64> = 50.1..60.0;

/// What a single tick produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// One-based tick counter.
    pub tick: u64,
    pub hour: u32,
    pub band: WindBand,
    pub record: PanelRecord,
    pub fault_injected: bool,
    pub resets: ResetReport,
}

/// Stateful panel model.
///
/// Each tick smooths wind speed toward a time-of-day target, derives the DC side from it,
/// resamples the AC side, random-walks temperature with occasional fault spikes and finally
/// applies the reset policy of [`SensorState::enforce_bounds`].
#[derive(Debug, Clone)]
pub struct SignalGenerator<E, C> {
    state: SensorState,
    entropy: E,
    clock: C,
    ticks: u64,
}

/// Generator drawing from the standard `rand` generator.
pub type RandGenerator<C> = SignalGenerator<StdEntropy, C>;

impl<C: HourClock> SignalGenerator<StdEntropy, C> {
    /// Reproducible generator for regression runs.
    pub fn seeded(seed: u64, clock: C) -> Self {
        Self::new(RandEntropy::seeded(seed), clock)
    }

    /// Generator seeded from the operating system.
    pub fn from_os(clock: C) -> Self {
        Self::new(RandEntropy::from_os(), clock)
    }
}

impl<E: Entropy, C: HourClock> SignalGenerator<E, C> {
    pub fn new(entropy: E, clock: C) -> Self {
        Self::with_state(SensorState::default(), entropy, clock)
    }

    pub fn with_state(state: SensorState, entropy: E, clock: C) -> Self {
        Self {
            state,
            entropy,
            clock,
            ticks: 0,
        }
    }

    pub fn state(&self) -> &SensorState {
        &self.state
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advance the model by one step.
    pub fn tick(&mut self) -> TickOutcome {
        let hour = self.clock.hour();
        let band = WindBand::for_hour(hour);
        let target = self.entropy.uniform(band.target_range());

        let state = &mut self.state;
        state.wind_speed = smooth_toward(state.wind_speed, target);
        state.voltage_ac = NOMINAL_VOLTAGE_AC + self.entropy.uniform(VOLTAGE_AC_JITTER);
        state.voltage_dc = 12.0 + state.wind_speed / 10.0;
        state.current_dc = 1.0 + state.wind_speed / 5.0;
        state.current_ac = NOMINAL_CURRENT_AC + self.entropy.uniform(CURRENT_AC_JITTER);
        state.temperature += self.entropy.uniform(TEMPERATURE_STEP);

        let fault_injected = self.entropy.unit() < FAULT_PROBABILITY;
        if fault_injected {
            state.temperature = round_tenth(self.entropy.uniform(FAULT_TEMPERATURE));
        }

        let resets = state.enforce_bounds();
        self.ticks += 1;

        if fault_injected {
            debug!(tick = self.ticks, temperature = state.temperature, "fault spike injected");
        }
        if resets.any() {
            debug!(tick = self.ticks, ?resets, "out-of-range readings reset");
        }

        TickOutcome {
            tick: self.ticks,
            hour,
            band,
            record: PanelRecord::from(&*state),
            fault_injected,
            resets,
        }
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
