//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Panel sensor state and the range-reset policy."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

/// Temperature at or above which a reading counts as a fault excursion.
pub const EXCURSION_THRESHOLD: f64 = 50.0;

/// Open interval a reading must stay inside, and the value it is reset to otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafeRange {
    pub low: f64,
    pub high: f64,
    pub reset: f64,
}

impl SafeRange {
    const fn new(low: f64, high: f64, reset: f64) -> Self {
        Self { low, high, reset }
    }

    /// Exclusive on both ends.
    pub fn contains(&self, value: f64) -> bool {
        self.low < value && value < self.high
    }

    fn clamp_to_reset(&self, value: &mut f64) -> bool {
        if self.contains(*value) {
            return false;
        }
        *value = self.reset;
        true
    }
}

pub const VOLTAGE_AC_RANGE: SafeRange = SafeRange::new(210.0, 240.0, 225.0);
pub const VOLTAGE_DC_RANGE: SafeRange = SafeRange::new(12.0, 14.8, 13.5);
pub const CURRENT_DC_RANGE: SafeRange = SafeRange::new(0.0, 15.0, 5.0);
pub const CURRENT_AC_RANGE: SafeRange = SafeRange::new(0.5, 4.0, 1.5);
pub const WIND_SPEED_RANGE: SafeRange = SafeRange::new(0.0, 40.0, 10.0);
pub const TEMPERATURE_RANGE: SafeRange = SafeRange::new(25.0, 48.0, 30.0);
pub const HUMIDITY_RANGE: SafeRange = SafeRange::new(50.0, 95.0, 75.0);

/// Fields that were reset by the last [`SensorState::enforce_bounds`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetReport {
    pub voltage_ac: bool,
    pub voltage_dc: bool,
    pub current_dc: bool,
    pub current_ac: bool,
    pub wind_speed: bool,
    pub temperature: bool,
    pub humidity: bool,
}

impl ResetReport {
    pub fn any(&self) -> bool {
        self.voltage_ac
            || self.voltage_dc
            || self.current_dc
            || self.current_ac
            || self.wind_speed
            || self.temperature
            || self.humidity
    }
}

/// Live readings of the simulated panel.
///
/// `humidity` is carried and range-checked but nothing mutates it, and the published
/// record uses a fixed humidity value instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorState {
    pub voltage_ac: f64,
    pub voltage_dc: f64,
    pub current_dc: f64,
    pub current_ac: f64,
    pub wind_speed: f64,
    pub temperature: f64,
    pub humidity: f64,
}

impl Default for SensorState {
    fn default() -> Self {
        Self {
            voltage_ac: 220.0,
            voltage_dc: 13.5,
            current_dc: 5.0,
            current_ac: 1.5,
            wind_speed: 5.0,
            temperature: 30.0,
            humidity: 70.0,
        }
    }
}

impl SensorState {
    /// Reset every out-of-range field to its baseline.
    ///
    /// Temperature is only reset while below [`EXCURSION_THRESHOLD`], so an excursion persists
    /// until the random walk carries it back under the threshold. Readings in [48, 50) are
    /// reset like any other out-of-range value.
    pub fn enforce_bounds(&mut self) -> ResetReport {
        let temperature = if self.temperature < EXCURSION_THRESHOLD {
            TEMPERATURE_RANGE.clamp_to_reset(&mut self.temperature)
        } else {
            false
        };
        ResetReport {
            voltage_ac: VOLTAGE_AC_RANGE.clamp_to_reset(&mut self.voltage_ac),
            voltage_dc: VOLTAGE_DC_RANGE.clamp_to_reset(&mut self.voltage_dc),
            current_dc: CURRENT_DC_RANGE.clamp_to_reset(&mut self.current_dc),
            current_ac: CURRENT_AC_RANGE.clamp_to_reset(&mut self.current_ac),
            wind_speed: WIND_SPEED_RANGE.clamp_to_reset(&mut self.wind_speed),
            temperature,
            humidity: HUMIDITY_RANGE.clamp_to_reset(&mut self.humidity),
        }
    }

    pub fn in_excursion(&self) -> bool {
        self.temperature > EXCURSION_THRESHOLD
    }
}
