//! # SimSweep Core
//!
//! Engine for driving parameter-sweep experiments against an external
//! discrete-event simulator. The simulator is a black box reached through a
//! child process per trial: one JSON parameter object on stdin, one JSON
//! result record on stdout.
//!
//! A sweep walks one simulator parameter across a half-open range, runs a
//! fixed number of replicate trials at each value, folds the trials into
//! per-point means with a confidence interval on response time, and renders
//! a chart suite from the aggregated series.
//!
//! ## Example
//!
//! ```ignore
//! use simsweep_core::{BaseConfig, ExperimentDriver, SimulatorClient, SweepSpec};
//!
//! let client = SimulatorClient::new("target/release/des");
//! let driver = ExperimentDriver::new(&client);
//! let spec = SweepSpec {
//!     variable: "n_users".to_string(),
//!     label: "Number of Users".to_string(),
//!     start: 10.0,
//!     end: 100.0,
//!     step: 10.0,
//!     runs_per_point: 3,
//! };
//! let results = driver.run_sweep(&spec, &BaseConfig::default(), None, |_| {})?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod analysis;
pub mod chart;
pub mod error;
pub mod simulator;
pub mod stats;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use analysis::{
    AggregatedPoint, ConfidenceReport, ExperimentDriver, SweepEvent, SweepMetric, SweepProgress,
    SweepResults, TrialAccumulator, TrialSamples,
};
pub use chart::{MetricSeries, render_sweep_charts};
pub use config::{
    BaseConfig, ConfidenceSpec, ExperimentConfig, ExperimentMode, FailurePolicy, SweepSpec,
};
pub use error::{ChartError, ConfigError, SimClientError, StatsError, SweepError};
pub use simulator::{SimulationRequest, SimulationResult, SimulatorClient};
pub use stats::ConfidenceInterval;
