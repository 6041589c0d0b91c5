//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Hour-of-day sources for the signal generator."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use chrono::{Local, Timelike};

/// Source of the local hour of day, in `0..24`.
pub trait HourClock {
    fn hour(&self) -> u32;
}

/// Reads the host's local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl HourClock for LocalClock {
    fn hour(&self) -> u32 {
        Local::now().hour()
    }
}

/// Always reports the same hour. Values are taken modulo 24.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedHour(u32);

impl FixedHour {
    pub fn new(hour: u32) -> Self {
        Self(hour % 24)
    }
}

impl HourClock for FixedHour {
    fn hour(&self) -> u32 {
        self.0
    }
}

impl<C: HourClock + ?Sized> HourClock for &C {
    fn hour(&self) -> u32 {
        (**self).hour()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_hour_wraps() {
        assert_eq!(FixedHour::new(14).hour(), 14);
        assert_eq!(FixedHour::new(26).hour(), 2);
    }

    #[test]
    fn local_clock_is_in_range() {
        assert!(LocalClock.hour() < 24);
    }
}
