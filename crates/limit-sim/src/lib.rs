pub mod config;
pub mod drift;
pub mod error;
pub mod playback;
pub mod run;
pub mod seed;
pub mod session;

pub use config::{Controls, SessionConfig};
pub use drift::DriftModel;
pub use error::{PlaybackError, SessionError};
pub use playback::{replay, replay_record, Playback, ReplaySummary};
pub use run::{RunConfiguration, RunRecord, SimulationRun, SimulationStep};
pub use seed::demo_calibration_run;
pub use session::{ChartPoint, SessionStatus, SimulationSession};
