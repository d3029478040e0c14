use crate::EngineMetrics;
use limit_core::SystemState;
use limit_sim::{RunRecord, SimulationStep};
use log::warn;

/// Records the step and reports whether the caller must stop the run.
pub fn halt_guard(
    metrics: &EngineMetrics,
    previous: Option<SystemState>,
    step: &SimulationStep,
) -> bool {
    metrics.observe_step(previous, step);
    let halt = step.calculated_state.is_terminal();
    if halt {
        warn!(
            "run {} must stop at step {} (effective energy {:.2})",
            step.run_id, step.step_index, step.effective_energy
        );
    }
    halt
}

/// Feeds a finished run through the metrics in step order.
pub fn observe_record(metrics: &EngineMetrics, record: &RunRecord) {
    let mut previous = None;
    for step in record.playback() {
        metrics.observe_step(previous, step);
        previous = Some(step.calculated_state);
    }
}
