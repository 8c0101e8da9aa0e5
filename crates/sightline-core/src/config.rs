//! Tunable sweep configuration.
//!
//! Loaded from JSON; every field is optional and falls back to its default.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Configuration shared by full and progressive sweeps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Observer eye height above terrain (meters).
    pub observer_height: f64,
    /// Angular step for a full sweep (degrees).
    pub degree_step: f64,
    /// Sample intervals per ray.
    pub sample_count: usize,
    /// New bearings cast per progressive batch.
    pub batch_size: usize,
    /// Distinct bearings a progressive sweep aims for.
    pub target_angle_count: usize,
    /// Pause between progressive batches (milliseconds).
    pub batch_delay_ms: u64,
    /// Quiet period before a restart launches a sweep (milliseconds).
    pub restart_debounce_ms: u64,
    /// Seed for the progressive bearing sampler.
    pub seed: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            observer_height: DEFAULT_OBSERVER_HEIGHT_M,
            degree_step: DEFAULT_DEGREE_STEP,
            sample_count: DEFAULT_SAMPLE_COUNT,
            batch_size: DEFAULT_BATCH_SIZE,
            target_angle_count: DEFAULT_TARGET_ANGLE_COUNT,
            batch_delay_ms: DEFAULT_BATCH_DELAY_MS,
            restart_debounce_ms: DEFAULT_RESTART_DEBOUNCE_MS,
            seed: DEFAULT_SEED,
        }
    }
}

impl SweepConfig {
    /// Parse a JSON document and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SweepConfig = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.observer_height.is_finite() || self.observer_height < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "observer_height must be a finite, non-negative number of meters (got {})",
                self.observer_height
            )));
        }
        if !self.degree_step.is_finite() || self.degree_step <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "degree_step must be positive (got {})",
                self.degree_step
            )));
        }
        if self.sample_count == 0 {
            return Err(ConfigError::Invalid("sample_count must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be at least 1".into()));
        }
        if self.target_angle_count == 0 {
            return Err(ConfigError::Invalid(
                "target_angle_count must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn restart_debounce(&self) -> Duration {
        Duration::from_millis(self.restart_debounce_ms)
    }
}

/// Failure to load a [`SweepConfig`].
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config: {e}"),
            ConfigError::Parse(e) => write!(f, "malformed config: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}
