use crate::error::PlaybackError;
use crate::run::{RunRecord, SimulationStep};
use limit_core::{Evaluator, SystemState};

/// Recorded steps in step order, regardless of insertion order.
pub struct Playback<'a> {
    steps: std::vec::IntoIter<&'a SimulationStep>,
}

impl<'a> Playback<'a> {
    pub fn new(record: &'a RunRecord) -> Self {
        let mut steps: Vec<&SimulationStep> = record.steps.iter().collect();
        steps.sort_by_key(|s| s.step_index);
        Self {
            steps: steps.into_iter(),
        }
    }
}

impl<'a> Iterator for Playback<'a> {
    type Item = &'a SimulationStep;

    fn next(&mut self) -> Option<Self::Item> {
        self.steps.next()
    }
}

impl RunRecord {
    pub fn playback(&self) -> Playback<'_> {
        Playback::new(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplaySummary {
    pub steps: usize,
    pub transitions: usize,
    pub peak_effective_energy: f64,
    pub final_state: SystemState,
    pub halted_at: Option<u64>,
}

/// Replays a run against the thresholds it was recorded with.
pub fn replay_record(record: &RunRecord) -> Result<ReplaySummary, PlaybackError> {
    let evaluator = Evaluator::new(record.run.thresholds)
        .map_err(|e| PlaybackError::InvalidThresholds(e.to_string()))?;
    replay(record, &evaluator)
}

/// Re-evaluates every recorded step, threading each recomputed state into
/// the next tick, and checks it against what was recorded.
pub fn replay(record: &RunRecord, evaluator: &Evaluator) -> Result<ReplaySummary, PlaybackError> {
    let mut previous: Option<SystemState> = None;
    let mut transitions = 0;
    let mut peak = f64::NEG_INFINITY;
    let mut halted_at = None;
    let mut steps = 0;

    for step in record.playback() {
        let result = evaluator.evaluate(&step.reading(previous));
        if result.state != step.calculated_state {
            return Err(PlaybackError::Diverged {
                step_index: step.step_index,
                recorded: step.calculated_state,
                recomputed: result.state,
            });
        }
        if previous.is_some_and(|p| p != result.state) {
            transitions += 1;
        }
        if result.state.is_terminal() && halted_at.is_none() {
            halted_at = Some(step.step_index);
        }
        peak = peak.max(result.effective_energy);
        previous = Some(result.state);
        steps += 1;
    }

    let final_state = previous.ok_or(PlaybackError::Empty)?;
    Ok(ReplaySummary {
        steps,
        transitions,
        peak_effective_energy: peak,
        final_state,
        halted_at,
    })
}
