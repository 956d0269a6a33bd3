//! Experiment configuration.
//!
//! A configuration file is a single flat JSON object. A small set of
//! driver-level keys (sweep bounds, replicate count, failure policy, output
//! directory) is consumed here; every other key is treated as a simulator
//! parameter and forwarded verbatim with each trial request.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::analysis::SweepMetric;
use crate::error::ConfigError;

fn default_runs_per_point() -> usize {
    3
}

fn default_confidence_trials() -> usize {
    30
}

fn default_confidence_error() -> f64 {
    0.05
}

fn default_output_directory() -> PathBuf {
    PathBuf::from(".")
}

/// How the driver reacts when a trial inside a sweep point fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the whole sweep at the first failed trial
    #[default]
    Halt,
    /// Abandon the failing point, leave a gap in the series, keep sweeping
    Skip,
}

/// Which experiment the configuration file selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RunMode {
    #[default]
    Sweep,
    Confidence,
}

/// A one-dimensional sweep over a single simulator parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSpec {
    /// Simulator parameter overwritten at each sweep point
    pub variable: String,
    /// Human-readable axis label, defaulting to the variable name
    pub label: String,
    /// First sweep value (inclusive)
    pub start: f64,
    /// Enumeration bound (exclusive)
    pub end: f64,
    /// Increment between consecutive values; must be positive
    pub step: f64,
    /// Replicate trials per sweep value
    pub runs_per_point: usize,
}

impl SweepSpec {
    /// Reject sweeps that could not produce a finite, non-empty run.
    ///
    /// Runs fail here before any trial is launched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("start", self.start), ("end", self.end), ("step", self.step)] {
            if !value.is_finite() {
                return Err(ConfigError::InvalidSweep(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        if self.step <= 0.0 {
            return Err(ConfigError::InvalidSweep(format!(
                "step must be positive, got {}",
                self.step
            )));
        }
        if self.start >= self.end {
            return Err(ConfigError::InvalidSweep(format!(
                "start ({}) must be below end ({})",
                self.start, self.end
            )));
        }
        if self.runs_per_point == 0 {
            return Err(ConfigError::InvalidSweep(
                "runs_per_point must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Enumerate the sweep values: `start, start + step, ...`, strictly
    /// below `end`.
    ///
    /// Each value is `start + i * step` rather than a running sum, so long
    /// fractional sweeps do not accumulate floating-point drift.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        if !(self.step > 0.0) || !(self.start < self.end) {
            return Vec::new();
        }
        let mut values = Vec::new();
        let mut i = 0usize;
        loop {
            let value = self.start + i as f64 * self.step;
            if value >= self.end {
                break;
            }
            values.push(value);
            i += 1;
        }
        values
    }

    /// True when every sweep value is a whole number, in which case the
    /// swept parameter is serialized as a JSON integer.
    #[must_use]
    pub fn is_integral(&self) -> bool {
        self.start.fract() == 0.0 && self.step.fract() == 0.0
    }
}

/// A fixed-configuration replicate run reporting one confidence interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceSpec {
    /// Replicate trials to run against the unmodified base configuration
    pub trials: usize,
    /// Metric the interval is reported on
    pub metric: SweepMetric,
}

/// The experiment selected by the configuration's `mode` key.
#[derive(Debug, Clone, PartialEq)]
pub enum ExperimentMode {
    Sweep(SweepSpec),
    Confidence(ConfidenceSpec),
}

/// Simulator parameters passed through untouched, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaseConfig {
    params: Map<String, Value>,
}

impl BaseConfig {
    #[must_use]
    pub fn new(params: Map<String, Value>) -> Self {
        Self { params }
    }

    #[must_use]
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// On-disk layout: driver-level keys plus arbitrary simulator parameters.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    mode: RunMode,
    variable: Option<String>,
    label: Option<String>,
    start: Option<f64>,
    end: Option<f64>,
    step: Option<f64>,
    #[serde(default = "default_runs_per_point")]
    runs_per_point: usize,
    #[serde(default = "default_output_directory")]
    output_directory: PathBuf,
    #[serde(default = "default_confidence_trials")]
    confidence_trials: usize,
    confidence_metric: Option<SweepMetric>,
    #[serde(default = "default_confidence_error")]
    confidence_error: f64,
    #[serde(default)]
    on_trial_failure: FailurePolicy,
    trial_timeout_secs: Option<f64>,
    #[serde(flatten)]
    simulator: Map<String, Value>,
}

/// A fully resolved experiment configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentConfig {
    pub mode: ExperimentMode,
    /// Simulator parameters forwarded verbatim with each request
    pub base: BaseConfig,
    /// Directory chart files and the results export are written under
    pub output_directory: PathBuf,
    /// Two-sided significance level for confidence intervals
    pub confidence_error: f64,
    pub on_trial_failure: FailurePolicy,
    /// Per-trial wall-clock limit; `None` waits indefinitely
    pub trial_timeout: Option<Duration>,
}

impl ExperimentConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawConfig = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        if !(raw.confidence_error > 0.0 && raw.confidence_error < 1.0) {
            return Err(ConfigError::InvalidSweep(format!(
                "confidence_error must lie in (0, 1), got {}",
                raw.confidence_error
            )));
        }
        let trial_timeout = match raw.trial_timeout_secs {
            Some(secs) if secs > 0.0 => {
                let limit = Duration::try_from_secs_f64(secs).map_err(|_| {
                    ConfigError::InvalidSweep(format!(
                        "trial_timeout_secs does not fit a duration, got {secs}"
                    ))
                })?;
                Some(limit)
            }
            Some(secs) => {
                return Err(ConfigError::InvalidSweep(format!(
                    "trial_timeout_secs must be positive, got {secs}"
                )));
            }
            None => None,
        };

        let mode = match raw.mode {
            RunMode::Sweep => {
                let variable = raw.variable.ok_or(ConfigError::MissingField("variable"))?;
                let start = raw.start.ok_or(ConfigError::MissingField("start"))?;
                let end = raw.end.ok_or(ConfigError::MissingField("end"))?;
                let step = raw.step.ok_or(ConfigError::MissingField("step"))?;
                let label = raw.label.unwrap_or_else(|| variable.clone());
                let spec = SweepSpec {
                    variable,
                    label,
                    start,
                    end,
                    step,
                    runs_per_point: raw.runs_per_point,
                };
                spec.validate()?;
                ExperimentMode::Sweep(spec)
            }
            RunMode::Confidence => {
                if raw.confidence_trials == 0 {
                    return Err(ConfigError::InvalidSweep(
                        "confidence_trials must be at least 1".to_string(),
                    ));
                }
                ExperimentMode::Confidence(ConfidenceSpec {
                    trials: raw.confidence_trials,
                    metric: raw.confidence_metric.unwrap_or(SweepMetric::RespTime),
                })
            }
        };

        Ok(Self {
            mode,
            base: BaseConfig::new(raw.simulator),
            output_directory: raw.output_directory,
            confidence_error: raw.confidence_error,
            on_trial_failure: raw.on_trial_failure,
            trial_timeout,
        })
    }
}
