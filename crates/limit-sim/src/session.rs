use crate::config::{Controls, SessionConfig};
use crate::drift::DriftModel;
use crate::error::SessionError;
use crate::run::{RunRecord, SimulationRun, SimulationStep};
use chrono::Utc;
use limit_core::{Evaluator, Reading, SystemState};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Running,
    Paused,
    /// Sticky until `reset`.
    Halted,
}

/// Point on the live chart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub step_index: u64,
    pub timestamp: f64,
    pub effective_energy: f64,
    pub state: SystemState,
}

/// Sequences evaluator calls for one run at a time and owns the halt and
/// reset policy the evaluator leaves to its caller.
pub struct SimulationSession {
    config: SessionConfig,
    evaluator: Evaluator,
    drift: DriftModel,
    rng: StdRng,
    controls: Controls,
    status: SessionStatus,
    current_state: SystemState,
    record: Option<RunRecord>,
    history: VecDeque<ChartPoint>,
    next_step: u64,
}

impl SimulationSession {
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let evaluator = Evaluator::new(config.thresholds)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let max_energy = config.max_energy;
        let controls = config.controls.clamped(max_energy);
        Ok(Self {
            evaluator,
            drift: DriftModel::new(max_energy),
            rng,
            controls,
            status: SessionStatus::Idle,
            current_state: SystemState::INITIAL,
            record: None,
            history: VecDeque::with_capacity(config.history_window),
            next_step: 0,
            config,
        })
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn current_state(&self) -> SystemState {
        self.current_state
    }

    pub fn controls(&self) -> Controls {
        self.controls
    }

    pub fn set_controls(&mut self, controls: Controls) {
        self.controls = controls.clamped(self.config.max_energy);
    }

    pub fn history(&self) -> impl Iterator<Item = &ChartPoint> {
        self.history.iter()
    }

    pub fn record(&self) -> Option<&RunRecord> {
        self.record.as_ref()
    }

    pub fn run_id(&self) -> Option<Uuid> {
        self.record.as_ref().map(|r| r.run.id)
    }

    /// Opens a fresh run and starts ticking, handing back the run it
    /// replaces. A halted session must be reset first.
    pub fn start(
        &mut self,
        name: impl Into<String>,
    ) -> Result<(Uuid, Option<RunRecord>), SessionError> {
        self.ensure_not_halted()?;
        let closed = self.record.take();
        if let Some(record) = &closed {
            info!(
                "run {} closed after {} steps by a new start",
                record.run.id,
                record.steps.len()
            );
        }
        let id = self.open_run(name.into());
        self.status = SessionStatus::Running;
        Ok((id, closed))
    }

    pub fn pause(&mut self) {
        if self.status == SessionStatus::Running {
            self.status = SessionStatus::Paused;
        }
    }

    pub fn resume(&mut self) -> Result<(), SessionError> {
        self.ensure_not_halted()?;
        self.status = SessionStatus::Running;
        Ok(())
    }

    /// Evaluates the current controls against the previous tick's state and
    /// records the step. The first tick of an idle session opens a run.
    pub fn tick(&mut self) -> Result<SimulationStep, SessionError> {
        match self.status {
            SessionStatus::Halted => return Err(self.halted_error()),
            SessionStatus::Paused => return Err(SessionError::Paused),
            SessionStatus::Idle | SessionStatus::Running => {}
        }
        if self.record.is_none() {
            let name = format!("Run {}", Utc::now().format("%H:%M:%S"));
            self.open_run(name);
        }
        self.status = SessionStatus::Running;

        if self.config.drift {
            self.controls.energy = self.drift.advance(&self.controls, &mut self.rng);
        }

        let previous = self.record.as_ref().and_then(RunRecord::final_state);
        let reading = Reading::new(
            self.controls.energy,
            self.controls.trend,
            self.controls.noise,
            previous,
        );
        let result = self.evaluator.evaluate(&reading);
        if !result.is_finite() {
            warn!("non-finite effective energy, classified as {}: {}", result.state, result.details);
        }

        let step_index = self.next_step;
        let timestamp = step_index as f64 * self.config.tick_seconds();
        let Some(record) = self.record.as_mut() else {
            return Err(SessionError::NoActiveRun);
        };
        let step = SimulationStep {
            run_id: record.run.id,
            step_index,
            timestamp,
            energy: reading.energy,
            trend: reading.trend,
            noise: reading.noise,
            effective_energy: result.effective_energy,
            calculated_state: result.state,
        };
        record.steps.push(step.clone());
        self.next_step += 1;

        if self.history.len() == self.config.history_window {
            self.history.pop_front();
        }
        self.history.push_back(ChartPoint {
            step_index,
            timestamp,
            effective_energy: result.effective_energy,
            state: result.state,
        });

        debug!("step {step_index}: {}", result.details);
        if result.state != self.current_state {
            info!(
                "run {}: {} -> {} at step {step_index}",
                step.run_id, self.current_state, result.state
            );
        }
        self.current_state = result.state;

        if result.state.is_terminal() {
            warn!("run {} halted at step {step_index}: {}", step.run_id, result.details);
            self.status = SessionStatus::Halted;
        }
        Ok(step)
    }

    /// Ticks until the run halts or `max_ticks` steps were taken.
    pub fn run_for(&mut self, max_ticks: usize) -> Result<Vec<SimulationStep>, SessionError> {
        let mut steps = Vec::new();
        for _ in 0..max_ticks {
            steps.push(self.tick()?);
            if self.status == SessionStatus::Halted {
                break;
            }
        }
        Ok(steps)
    }

    /// Renames the active run. A blank name falls back to a timestamped one.
    pub fn rename(&mut self, name: &str) -> Result<(), SessionError> {
        let record = self.record.as_mut().ok_or(SessionError::NoActiveRun)?;
        let name = name.trim();
        record.run.name = if name.is_empty() {
            format!("Simulation {}", Utc::now().format("%H:%M:%S"))
        } else {
            name.to_string()
        };
        Ok(())
    }

    /// Returns to the initial state with default controls and hands back the
    /// finished run, if any. This is the only way out of a halt.
    pub fn reset(&mut self) -> Option<RunRecord> {
        let finished = self.record.take();
        if let Some(record) = &finished {
            info!("run {} closed after {} steps", record.run.id, record.steps.len());
        }
        self.status = SessionStatus::Idle;
        self.current_state = SystemState::INITIAL;
        self.history.clear();
        self.next_step = 0;
        self.controls = self
            .config
            .controls
            .clamped(self.config.max_energy);
        finished
    }

    fn open_run(&mut self, name: String) -> Uuid {
        let c = self.controls;
        let description = format!(
            "Max Energy: {}, Trend: {}, Noise: {}",
            c.energy, c.trend, c.noise
        );
        let run = SimulationRun::new(
            name,
            Some(description),
            self.config.run_configuration(),
            *self.evaluator.thresholds(),
        );
        let id = run.id;
        info!("run {id} started: {}", run.name);
        self.record = Some(RunRecord::new(run));
        self.history.clear();
        self.next_step = 0;
        self.current_state = SystemState::INITIAL;
        id
    }

    fn ensure_not_halted(&self) -> Result<(), SessionError> {
        if self.status == SessionStatus::Halted {
            return Err(self.halted_error());
        }
        Ok(())
    }

    fn halted_error(&self) -> SessionError {
        SessionError::Halted {
            run_id: self.run_id().unwrap_or_else(Uuid::nil),
        }
    }
}
