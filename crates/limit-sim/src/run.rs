use chrono::{DateTime, Utc};
use limit_core::{EngineThresholds, Reading, SystemState};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Parameters a run was started with, kept alongside its steps.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RunConfiguration {
    pub max_energy: f64,
    pub boundary_threshold: f64,
    pub halt_threshold: f64,
}

impl Default for RunConfiguration {
    fn default() -> Self {
        Self {
            max_energy: 1.5,
            boundary_threshold: 0.8,
            halt_threshold: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRun {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub configuration: RunConfiguration,
    /// Limits the steps were classified with. Nested as a config value, so
    /// its fields keep their config names.
    #[serde(default)]
    pub thresholds: EngineThresholds,
}

impl SimulationRun {
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        configuration: RunConfiguration,
        thresholds: EngineThresholds,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description,
            created_at: Utc::now(),
            configuration,
            thresholds,
        }
    }
}

/// One evaluated tick. `energy` is the raw input; `effective_energy` is
/// what the chart plots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimulationStep {
    pub run_id: Uuid,
    pub step_index: u64,
    /// Simulation time in seconds.
    pub timestamp: f64,
    pub energy: f64,
    pub trend: f64,
    pub noise: f64,
    pub effective_energy: f64,
    pub calculated_state: SystemState,
}

impl SimulationStep {
    pub fn reading(&self, previous_state: Option<SystemState>) -> Reading {
        Reading::new(self.energy, self.trend, self.noise, previous_state)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunRecord {
    pub run: SimulationRun,
    pub steps: Vec<SimulationStep>,
}

impl RunRecord {
    pub fn new(run: SimulationRun) -> Self {
        Self {
            run,
            steps: Vec::new(),
        }
    }

    pub fn final_state(&self) -> Option<SystemState> {
        self.steps.last().map(|s| s.calculated_state)
    }

    pub fn halted(&self) -> bool {
        self.steps.iter().any(|s| s.calculated_state.is_terminal())
    }
}
