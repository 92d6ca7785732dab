use core::fmt;
use serde::{Deserialize, Serialize};

use crate::gains::TuningRule;

/// Tuner configuration, fixed for the duration of a run.
///
/// Nothing here is range checked: a noise band wider than the oscillation or
/// a zero sample period simply produce a tuner that never sees a peak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct TunerConfig {
    /// Process value the relay switches around.
    pub setpoint: f32,
    /// Hysteresis half-width around the setpoint.
    pub noise_band: f32,
    /// Minimum time between two processed samples.
    pub sample_period_ms: u32,
    pub output_high: f32,
    pub output_low: f32,
    pub rule: TuningRule,
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            setpoint: 214.5,
            noise_band: 1.0,
            sample_period_ms: 1000,
            output_high: 500.0,
            output_low: 0.0,
            rule: TuningRule::ClassicPid,
        }
    }
}

impl TunerConfig {
    /// Builder: set the setpoint.
    pub fn with_setpoint(mut self, setpoint: f32) -> Self {
        self.setpoint = setpoint;
        self
    }

    /// Builder: set the hysteresis half-width.
    pub fn with_noise_band(mut self, noise_band: f32) -> Self {
        self.noise_band = noise_band;
        self
    }

    /// Builder: set the minimum sample interval.
    pub fn with_sample_period_ms(mut self, sample_period_ms: u32) -> Self {
        self.sample_period_ms = sample_period_ms;
        self
    }

    /// Builder: set both relay levels.
    pub fn with_output_levels(mut self, low: f32, high: f32) -> Self {
        self.output_low = low;
        self.output_high = high;
        self
    }

    /// Builder: pick the gain rule.
    pub fn with_rule(mut self, rule: TuningRule) -> Self {
        self.rule = rule;
        self
    }

    /// Distance between the two relay levels.
    pub fn relay_amplitude(&self) -> f32 {
        self.output_high - self.output_low
    }

    /// Upper edge of the hysteresis band.
    pub fn upper_threshold(&self) -> f32 {
        self.setpoint + self.noise_band
    }

    /// Lower edge of the hysteresis band.
    pub fn lower_threshold(&self) -> f32 {
        self.setpoint - self.noise_band
    }

    /// Parse a JSON document, e.g. `{"setpoint":93.0,"output_high":100.0}`.
    /// Missing fields keep their defaults.
    pub fn from_json(json: &[u8]) -> Result<Self, ConfigError> {
        let (config, _) = serde_json_core::from_slice::<TunerConfig>(json)
            .map_err(|_| ConfigError::Parse)?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    Parse,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse => write!(f, "Invalid tuner configuration"),
        }
    }
}
