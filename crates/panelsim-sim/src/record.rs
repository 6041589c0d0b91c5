//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Delimited panel record published on the bus."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::state::{SensorState, EXCURSION_THRESHOLD};

/// Humidity value written into every record, regardless of the live humidity reading.
pub const PUBLISHED_HUMIDITY: f64 = 70.0;

/// Number of comma-separated values in a record.
pub const FIELD_COUNT: usize = 7;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected 7 fields, found {0}")]
    FieldCount(usize),
    #[error("field {index} ('{value}') is not a number")]
    InvalidNumber { index: usize, value: String },
}

/// How a published record is reported in the local log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framing {
    Normal,
    /// Temperature is above the excursion threshold.
    Alert,
}

impl Framing {
    pub fn for_temperature(temperature: f64) -> Self {
        if temperature > EXCURSION_THRESHOLD {
            Framing::Alert
        } else {
            Framing::Normal
        }
    }
}

/// One panel snapshot in wire order.
///
/// Encodes as `voltage_ac,voltage_dc,current_dc,current_ac,wind_speed,temperature,humidity`
/// with two decimals for the first five values and one for the last two.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelRecord {
    pub voltage_ac: f64,
    pub voltage_dc: f64,
    pub current_dc: f64,
    pub current_ac: f64,
    pub wind_speed: f64,
    pub temperature: f64,
    pub humidity: f64,
}

impl PanelRecord {
    pub fn framing(&self) -> Framing {
        Framing::for_temperature(self.temperature)
    }

    /// Wire payload for this record.
    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl From<&SensorState> for PanelRecord {
    fn from(state: &SensorState) -> Self {
        Self {
            voltage_ac: state.voltage_ac,
            voltage_dc: state.voltage_dc,
            current_dc: state.current_dc,
            current_ac: state.current_ac,
            wind_speed: state.wind_speed,
            temperature: state.temperature,
            humidity: PUBLISHED_HUMIDITY,
        }
    }
}

impl fmt::Display for PanelRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2},{:.2},{:.2},{:.2},{:.2},{:.1},{:.1}",
            self.voltage_ac,
            self.voltage_dc,
            self.current_dc,
            self.current_ac,
            self.wind_speed,
            self.temperature,
            self.humidity
        )
    }
}

impl FromStr for PanelRecord {
    type Err = RecordError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = line.trim_end().split(',').collect();
        if parts.len() != FIELD_COUNT {
            return Err(RecordError::FieldCount(parts.len()));
        }
        let mut values = [0.0f64; FIELD_COUNT];
        for (index, (slot, raw)) in values.iter_mut().zip(&parts).enumerate() {
            *slot = raw
                .trim()
                .parse::<f64>()
                .map_err(|_| RecordError::InvalidNumber {
                    index,
                    value: (*raw).to_owned(),
                })?;
        }
        let [voltage_ac, voltage_dc, current_dc, current_ac, wind_speed, temperature, humidity] =
            values;
        Ok(Self {
            voltage_ac,
            voltage_dc,
            current_dc,
            current_ac,
            wind_speed,
            temperature,
            humidity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PanelRecord {
        PanelRecord {
            voltage_ac: 221.344,
            voltage_dc: 13.7,
            current_dc: 2.4,
            current_ac: 1.6249,
            wind_speed: 17.0,
            temperature: 31.43,
            humidity: PUBLISHED_HUMIDITY,
        }
    }

    #[test]
    fn formats_with_fixed_precision() {
        assert_eq!(
            sample().to_line(),
            "221.34,13.70,2.40,1.62,17.00,31.4,70.0"
        );
    }

    #[test]
    fn humidity_is_the_constant_not_the_state() {
        let state = SensorState {
            humidity: 88.8,
            ..SensorState::default()
        };
        let record = PanelRecord::from(&state);
        assert_eq!(record.humidity, 70.0);
        assert!(record.to_line().ends_with(",70.0"));
    }

    #[test]
    fn parses_wire_line() {
        let record: PanelRecord = "221.34,13.70,2.40,1.62,17.00,55.3,70.0".parse().unwrap();
        assert_eq!(record.voltage_ac, 221.34);
        assert_eq!(record.temperature, 55.3);
        assert_eq!(record.framing(), Framing::Alert);
    }

    #[test]
    fn rejects_wrong_field_count() {
        let err = "1,2,3".parse::<PanelRecord>().unwrap_err();
        assert_eq!(err, RecordError::FieldCount(3));
    }

    #[test]
    fn rejects_non_numeric_field() {
        let err = "221.34,13.70,x,1.62,17.00,31.4,70.0"
            .parse::<PanelRecord>()
            .unwrap_err();
        assert_eq!(
            err,
            RecordError::InvalidNumber {
                index: 2,
                value: "x".into()
            }
        );
    }

    #[test]
    fn framing_threshold_is_strict() {
        assert_eq!(Framing::for_temperature(50.0), Framing::Normal);
        assert_eq!(Framing::for_temperature(50.1), Framing::Alert);
        assert_eq!(Framing::for_temperature(31.0), Framing::Normal);
    }
}
