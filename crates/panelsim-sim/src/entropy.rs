//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Random draws consumed by the signal generator."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::ops::Range;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random draws the generator needs each tick.
pub trait Entropy {
    /// Uniform sample from a half-open range.
    fn uniform(&mut self, range: Range<f64>) -> f64;

    /// Uniform sample from `[0, 1)`.
    fn unit(&mut self) -> f64;
}

/// Entropy from the standard `rand` generator.
pub type StdEntropy = RandEntropy<StdRng>;

/// [`Entropy`] backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RandEntropy<R> {
    rng: R,
}

impl<R: Rng> RandEntropy<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandEntropy<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_os() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> Entropy for RandEntropy<R> {
    fn uniform(&mut self, range: Range<f64>) -> f64 {
        self.rng.gen_range(range)
    }

    fn unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

impl<E: Entropy + ?Sized> Entropy for Box<E> {
    fn uniform(&mut self, range: Range<f64>) -> f64 {
        (**self).uniform(range)
    }

    fn unit(&mut self) -> f64 {
        (**self).unit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_draws_repeat() {
        let mut a = RandEntropy::seeded(9);
        let mut b = RandEntropy::seeded(9);
        for _ in 0..16 {
            assert_eq!(a.uniform(-1.5..1.5), b.uniform(-1.5..1.5));
            assert_eq!(a.unit(), b.unit());
        }
    }

    #[test]
    fn draws_stay_in_range() {
        let mut entropy = RandEntropy::seeded(1);
        for _ in 0..1000 {
            let value = entropy.uniform(50.1..60.0);
            assert!((50.1..60.0).contains(&value));
            let unit = entropy.unit();
            assert!((0.0..1.0).contains(&unit));
        }
    }
}
