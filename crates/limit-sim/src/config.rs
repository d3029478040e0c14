use crate::error::SessionError;
use crate::run::RunConfiguration;
use limit_core::EngineThresholds;
use serde::{Deserialize, Serialize};

pub const TREND_RANGE: (f64, f64) = (-0.5, 0.5);
pub const NOISE_RANGE: (f64, f64) = (0.0, 1.0);

/// User-chosen inputs fed to every tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Controls {
    pub energy: f64,
    pub trend: f64,
    pub noise: f64,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            energy: 0.5,
            trend: 0.0,
            noise: 0.1,
        }
    }
}

impl Controls {
    /// Pins each control to its panel range. NaN is left as is.
    pub fn clamped(self, max_energy: f64) -> Self {
        Self {
            energy: self.energy.clamp(0.0, max_energy.max(0.0)),
            trend: self.trend.clamp(TREND_RANGE.0, TREND_RANGE.1),
            noise: self.noise.clamp(NOISE_RANGE.0, NOISE_RANGE.1),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Wall-clock spacing of ticks; also the simulation time step.
    pub tick_interval_ms: u64,
    /// Number of chart points kept for the live view.
    pub history_window: usize,
    pub controls: Controls,
    /// Upper end of the energy control and of the drift.
    pub max_energy: f64,
    /// Recorded on each run as metadata; classification uses `thresholds`.
    pub boundary_threshold: f64,
    pub halt_threshold: f64,
    pub thresholds: EngineThresholds,
    /// Let the base energy wander with trend and noise between ticks.
    pub drift: bool,
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 200,
            history_window: 100,
            controls: Controls::default(),
            max_energy: 1.5,
            boundary_threshold: 0.8,
            halt_threshold: 1.0,
            thresholds: EngineThresholds::default(),
            drift: false,
            seed: None,
        }
    }
}

impl SessionConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, SessionError> {
        let config: SessionConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        self.thresholds.validate()?;
        if self.history_window == 0 {
            return Err(SessionError::InvalidConfig("history_window must be at least 1".into()));
        }
        if !self.max_energy.is_finite() || self.max_energy < 0.0 {
            return Err(SessionError::InvalidConfig(format!(
                "max_energy must be finite and non-negative, got {}",
                self.max_energy
            )));
        }
        Ok(())
    }

    pub fn run_configuration(&self) -> RunConfiguration {
        RunConfiguration {
            max_energy: self.max_energy,
            boundary_threshold: self.boundary_threshold,
            halt_threshold: self.halt_threshold,
        }
    }

    pub fn tick_seconds(&self) -> f64 {
        self.tick_interval_ms as f64 / 1000.0
    }
}
