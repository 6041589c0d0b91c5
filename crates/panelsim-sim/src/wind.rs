//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Time-of-day wind profile."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::ops::Range;

/// Weight of the new target in the wind-speed moving average.
pub const WIND_SMOOTHING: f64 = 0.1;

/// Daily wind regime selected from the local hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindBand {
    /// 05:00 to 11:59, light wind.
    Morning,
    /// 12:00 to 17:59, strong wind.
    Afternoon,
    /// Everything else, moderate wind.
    Night,
}

impl WindBand {
    pub fn for_hour(hour: u32) -> Self {
        match hour {
            5..=11 => WindBand::Morning,
            12..=17 => WindBand::Afternoon,
            _ => WindBand::Night,
        }
    }

    /// Range the target wind speed is drawn from, in m/s.
    pub fn target_range(&self) -> Range<f64> {
        match self {
            WindBand::Morning => 3.0..8.0,
            WindBand::Afternoon => 10.0..25.0,
            WindBand::Night => 6.0..15.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WindBand::Morning => "morning",
            WindBand::Afternoon => "afternoon",
            WindBand::Night => "night",
        }
    }
}

/// Move `current` a fixed fraction of the way toward `target`.
pub fn smooth_toward(current: f64, target: f64) -> f64 {
    current + (target - current) * WIND_SMOOTHING
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges() {
        assert_eq!(WindBand::for_hour(4), WindBand::Night);
        assert_eq!(WindBand::for_hour(5), WindBand::Morning);
        assert_eq!(WindBand::for_hour(11), WindBand::Morning);
        assert_eq!(WindBand::for_hour(12), WindBand::Afternoon);
        assert_eq!(WindBand::for_hour(17), WindBand::Afternoon);
        assert_eq!(WindBand::for_hour(18), WindBand::Night);
        assert_eq!(WindBand::for_hour(0), WindBand::Night);
        assert_eq!(WindBand::for_hour(23), WindBand::Night);
    }

    #[test]
    fn smoothing_moves_a_tenth_of_the_gap() {
        assert!((smooth_toward(5.0, 15.0) - 6.0).abs() < 1e-12);
        assert!((smooth_toward(10.0, 0.0) - 9.0).abs() < 1e-12);
    }
}
