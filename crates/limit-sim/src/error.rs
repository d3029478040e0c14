use limit_core::{ConfigError, SystemState};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("run {run_id} reached SYSTEM_SHOULD_HALT; reset before continuing")]
    Halted { run_id: Uuid },
    #[error("session is paused")]
    Paused,
    #[error("no active run")]
    NoActiveRun,
    #[error("invalid session config: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Thresholds(#[from] ConfigError),
    #[error("invalid session document: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum PlaybackError {
    #[error("run has no recorded steps")]
    Empty,
    #[error("run recorded unusable thresholds: {0}")]
    InvalidThresholds(String),
    #[error("step {step_index} recorded {recorded} but recomputes to {recomputed}")]
    Diverged {
        step_index: u64,
        recorded: SystemState,
        recomputed: SystemState,
    },
}
