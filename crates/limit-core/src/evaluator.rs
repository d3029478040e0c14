use crate::state::SystemState;
use crate::thresholds::{ConfigError, EngineThresholds, NOISE_WEIGHT, TREND_LOOKAHEAD};
use serde::{Deserialize, Serialize};

/// One tick's input. `previous_state` is `None` only on the first tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub energy: f64,
    pub trend: f64,
    pub noise: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_state: Option<SystemState>,
}

impl Reading {
    pub fn new(energy: f64, trend: f64, noise: f64, previous_state: Option<SystemState>) -> Self {
        Self {
            energy,
            trend,
            noise,
            previous_state,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub state: SystemState,
    /// The value compared against the thresholds, and the one to plot.
    pub effective_energy: f64,
    pub details: String,
}

impl EvaluationResult {
    /// False when a NaN or infinite input leaked into the effective energy.
    /// NaN falls through every band comparison and reads as `Stable`.
    pub fn is_finite(&self) -> bool {
        self.effective_energy.is_finite()
    }
}

/// Stateless classifier. Holds only its validated thresholds, so one value
/// can be shared across threads and called concurrently.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Evaluator {
    thresholds: EngineThresholds,
}

impl Evaluator {
    pub fn new(thresholds: EngineThresholds) -> Result<Self, ConfigError> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &EngineThresholds {
        &self.thresholds
    }

    /// `energy + trend * 0.5 + |noise| * 0.5`
    pub fn effective_energy(energy: f64, trend: f64, noise: f64) -> f64 {
        energy + trend * TREND_LOOKAHEAD + noise.abs() * NOISE_WEIGHT
    }

    /// Threshold bands with inclusive lower bounds, no hysteresis.
    pub fn classify(&self, effective_energy: f64) -> SystemState {
        let t = &self.thresholds;
        if effective_energy >= t.halt_limit {
            SystemState::SystemShouldHalt
        } else if effective_energy >= t.boundary_limit {
            SystemState::Unstable
        } else if effective_energy >= t.stable_limit {
            SystemState::BoundaryZone
        } else {
            SystemState::Stable
        }
    }

    /// Damps single-level descents only. Upward moves, descents out of
    /// `SystemShouldHalt` and the two-level `Unstable -> Stable` drop pass
    /// through unchanged.
    pub fn apply_hysteresis(
        &self,
        raw: SystemState,
        previous: Option<SystemState>,
        effective_energy: f64,
    ) -> SystemState {
        match (previous, raw) {
            (Some(SystemState::Unstable), SystemState::BoundaryZone)
                if effective_energy > self.thresholds.unstable_release() =>
            {
                SystemState::Unstable
            }
            (Some(SystemState::BoundaryZone), SystemState::Stable)
                if effective_energy > self.thresholds.boundary_release() =>
            {
                SystemState::BoundaryZone
            }
            _ => raw,
        }
    }

    pub fn evaluate(&self, reading: &Reading) -> EvaluationResult {
        let effective_energy = Self::effective_energy(reading.energy, reading.trend, reading.noise);
        let raw = self.classify(effective_energy);
        let state = self.apply_hysteresis(raw, reading.previous_state, effective_energy);
        let details = format!(
            "Energy: {:.2} | Eff: {:.2}{}",
            reading.energy,
            effective_energy,
            state.details_suffix()
        );
        EvaluationResult {
            state,
            effective_energy,
            details,
        }
    }
}

/// Evaluates one tick against the default thresholds.
pub fn evaluate(
    energy: f64,
    trend: f64,
    noise: f64,
    previous_state: Option<SystemState>,
) -> EvaluationResult {
    Evaluator::default().evaluate(&Reading::new(energy, trend, noise, previous_state))
}
