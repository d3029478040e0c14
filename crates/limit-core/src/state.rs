use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete classification of the effective energy.
///
/// Variant order is severity order, so the derived `Ord` gives
/// `Stable < BoundaryZone < Unstable < SystemShouldHalt`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemState {
    #[default]
    Stable,
    BoundaryZone,
    Unstable,
    SystemShouldHalt,
}

impl SystemState {
    /// State assumed before the first tick of a sequence.
    pub const INITIAL: SystemState = SystemState::Stable;

    pub const ALL: [SystemState; 4] = [
        SystemState::Stable,
        SystemState::BoundaryZone,
        SystemState::Unstable,
        SystemState::SystemShouldHalt,
    ];

    pub fn severity(self) -> u8 {
        match self {
            SystemState::Stable => 0,
            SystemState::BoundaryZone => 1,
            SystemState::Unstable => 2,
            SystemState::SystemShouldHalt => 3,
        }
    }

    /// No exit transition is defined out of this state by the evaluator.
    pub fn is_terminal(self) -> bool {
        matches!(self, SystemState::SystemShouldHalt)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SystemState::Stable => "STABLE",
            SystemState::BoundaryZone => "BOUNDARY_ZONE",
            SystemState::Unstable => "UNSTABLE",
            SystemState::SystemShouldHalt => "SYSTEM_SHOULD_HALT",
        }
    }

    pub(crate) fn details_suffix(self) -> &'static str {
        match self {
            SystemState::SystemShouldHalt => " - CRITICAL LIMIT BREACH",
            SystemState::Unstable => " - High Instability Detected",
            SystemState::BoundaryZone => " - Approaching Limits",
            SystemState::Stable => " - System Nominal",
        }
    }
}

impl fmt::Display for SystemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
