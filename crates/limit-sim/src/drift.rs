use crate::config::Controls;
use rand::Rng;

/// Fraction of the trend applied to the base energy per tick.
pub const DRIFT_STEP: f64 = 0.05;
/// Scale of the uniform jitter drawn from the noise control.
pub const NOISE_JITTER: f64 = 0.2;

/// Moves the base energy between ticks. The evaluator only ever sees the
/// materialized value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftModel {
    pub max_energy: f64,
}

impl DriftModel {
    pub fn new(max_energy: f64) -> Self {
        Self { max_energy }
    }

    pub fn advance<R: Rng + ?Sized>(&self, controls: &Controls, rng: &mut R) -> f64 {
        let drift = controls.trend * DRIFT_STEP;
        let jitter = (rng.gen::<f64>() - 0.5) * controls.noise.abs() * NOISE_JITTER;
        (controls.energy + drift + jitter).clamp(0.0, self.max_energy.max(0.0))
    }
}
