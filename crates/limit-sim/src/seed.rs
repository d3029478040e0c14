use crate::run::{RunConfiguration, RunRecord, SimulationRun, SimulationStep};
use limit_core::{Evaluator, Reading, SystemState};

const DEMO_STEPS: u64 = 20;
const DEMO_TREND: f64 = 0.1;
const DEMO_NOISE: f64 = 0.05;

/// Ramp from 0.2 upward in 0.05 steps, every tick evaluated from `Stable`.
pub fn demo_calibration_run() -> RunRecord {
    let evaluator = Evaluator::default();
    let run = SimulationRun::new(
        "Demo Calibration Run",
        Some("Initial system calibration test".into()),
        RunConfiguration::default(),
        *evaluator.thresholds(),
    );
    let run_id = run.id;
    let mut record = RunRecord::new(run);

    for i in 0..DEMO_STEPS {
        let energy = 0.2 + i as f64 * 0.05;
        let result = evaluator.evaluate(&Reading::new(
            energy,
            DEMO_TREND,
            DEMO_NOISE,
            Some(SystemState::Stable),
        ));
        record.steps.push(SimulationStep {
            run_id,
            step_index: i,
            timestamp: i as f64 * 0.5,
            energy,
            trend: DEMO_TREND,
            noise: DEMO_NOISE,
            effective_energy: result.effective_energy,
            calculated_state: result.state,
        });
    }
    record
}
