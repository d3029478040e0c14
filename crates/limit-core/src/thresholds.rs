use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const STABLE_LIMIT: f64 = 0.6;
pub const BOUNDARY_LIMIT: f64 = 0.85;
pub const HALT_LIMIT: f64 = 1.0;
pub const HYSTERESIS_BUFFER: f64 = 0.1;

/// Trend is projected half a time unit ahead.
pub const TREND_LOOKAHEAD: f64 = 0.5;
/// Worst-case share of the noise magnitude added on top of the reading.
pub const NOISE_WEIGHT: f64 = 0.5;

/// Errors raised while loading or validating engine thresholds.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("threshold `{name}` must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },
    #[error("thresholds must be strictly ascending: stable {stable} < boundary {boundary} < halt {halt}")]
    NotAscending { stable: f64, boundary: f64, halt: f64 },
    #[error("hysteresis buffer must be non-negative, got {0}")]
    NegativeBuffer(f64),
    #[error("failed to read threshold file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid threshold document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Band limits and hysteresis margin used by the evaluator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineThresholds {
    pub stable_limit: f64,
    pub boundary_limit: f64,
    pub halt_limit: f64,
    pub hysteresis_buffer: f64,
}

impl Default for EngineThresholds {
    fn default() -> Self {
        Self {
            stable_limit: STABLE_LIMIT,
            boundary_limit: BOUNDARY_LIMIT,
            halt_limit: HALT_LIMIT,
            hysteresis_buffer: HYSTERESIS_BUFFER,
        }
    }
}

impl EngineThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("stable_limit", self.stable_limit),
            ("boundary_limit", self.boundary_limit),
            ("halt_limit", self.halt_limit),
            ("hysteresis_buffer", self.hysteresis_buffer),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { name, value });
            }
        }
        if !(self.stable_limit < self.boundary_limit && self.boundary_limit < self.halt_limit) {
            return Err(ConfigError::NotAscending {
                stable: self.stable_limit,
                boundary: self.boundary_limit,
                halt: self.halt_limit,
            });
        }
        if self.hysteresis_buffer < 0.0 {
            return Err(ConfigError::NegativeBuffer(self.hysteresis_buffer));
        }
        Ok(())
    }

    /// Parses a JSON document; absent fields keep their default value.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let thresholds: EngineThresholds = serde_json::from_str(raw)?;
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Level an `Unstable` reading must drop below to be released.
    pub fn unstable_release(&self) -> f64 {
        self.boundary_limit - self.hysteresis_buffer
    }

    /// Level a `BoundaryZone` reading must drop below to be released.
    pub fn boundary_release(&self) -> f64 {
        self.stable_limit - self.hysteresis_buffer
    }
}
