//! Folding replicate trials into aggregated sweep points.

use serde::{Deserialize, Serialize};

use crate::error::StatsError;
use crate::simulator::SimulationResult;
use crate::stats::{self, ConfidenceInterval};

use super::SweepMetric;

/// One aggregated sweep point: per-metric means over the replicate trials,
/// plus the response-time confidence interval. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedPoint {
    /// The sweep value this point was measured at
    pub x: f64,
    pub throughput: f64,
    pub goodput: f64,
    pub badput: f64,
    pub cpu_util: f64,
    pub timedout_frac: f64,
    pub dropped_frac: f64,
    pub total_failed_frac: f64,
    pub drop_rate: f64,
    /// Mean response time with its two-sided confidence bounds
    pub resp_time: ConfidenceInterval,
}

impl AggregatedPoint {
    /// Mean value of `metric` at this point.
    #[must_use]
    pub fn metric(&self, metric: SweepMetric) -> f64 {
        match metric {
            SweepMetric::RespTime => self.resp_time.mean,
            SweepMetric::Throughput => self.throughput,
            SweepMetric::Goodput => self.goodput,
            SweepMetric::Badput => self.badput,
            SweepMetric::CpuUtil => self.cpu_util,
            SweepMetric::TimedoutFrac => self.timedout_frac,
            SweepMetric::DroppedFrac => self.dropped_frac,
            SweepMetric::TotalFailedFrac => self.total_failed_frac,
            SweepMetric::DropRate => self.drop_rate,
        }
    }
}

/// Raw per-trial samples kept across the whole sweep for the trial-level
/// scatter charts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialSamples {
    pub throughput: Vec<f64>,
    pub resp_time: Vec<f64>,
    pub cpu_util: Vec<f64>,
}

impl TrialSamples {
    /// Record one successful trial.
    pub fn record(&mut self, result: &SimulationResult) {
        self.throughput.push(result.throughput);
        self.resp_time.push(result.resp_time);
        self.cpu_util.push(result.cpu_util);
    }

    /// Append every sample from `other`.
    pub fn merge(&mut self, other: &TrialSamples) {
        self.throughput.extend_from_slice(&other.throughput);
        self.resp_time.extend_from_slice(&other.resp_time);
        self.cpu_util.extend_from_slice(&other.cpu_util);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.throughput.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.throughput.is_empty()
    }
}

/// Accumulates replicate trial results for a single sweep point.
///
/// Raw metric values are summed as they arrive; response times additionally
/// keep the full sample list, which the confidence interval needs.
#[derive(Debug, Clone, Default)]
pub struct TrialAccumulator {
    throughput: f64,
    goodput: f64,
    cpu_util: f64,
    timedout_frac: f64,
    dropped_frac: f64,
    drop_rate: f64,
    resp_samples: Vec<f64>,
}

impl TrialAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of trials recorded so far.
    #[must_use]
    pub fn trials(&self) -> usize {
        self.resp_samples.len()
    }

    /// Fold one trial into the running sums.
    pub fn record(&mut self, result: &SimulationResult) {
        self.throughput += result.throughput;
        self.goodput += result.goodput;
        self.cpu_util += result.cpu_util;
        self.timedout_frac += result.timedout_frac;
        self.dropped_frac += result.dropped_frac;
        self.drop_rate += result.drop_rate;
        self.resp_samples.push(result.resp_time);
    }

    /// Close the point: divide the sums by the trial count, derive badput
    /// and the total failure fraction from the means, and attach the
    /// response-time interval.
    ///
    /// The interval's mean is the point's reported response time; there is
    /// no second averaging pass over the samples.
    pub fn finish(self, x: f64, error_rate: f64) -> Result<AggregatedPoint, StatsError> {
        if self.resp_samples.is_empty() {
            return Err(StatsError::Empty);
        }
        let resp_time = stats::confidence_interval(&self.resp_samples, error_rate)?;
        let n = self.resp_samples.len() as f64;
        let throughput = self.throughput / n;
        let goodput = self.goodput / n;
        let timedout_frac = self.timedout_frac / n;
        let dropped_frac = self.dropped_frac / n;
        Ok(AggregatedPoint {
            x,
            throughput,
            goodput,
            badput: throughput - goodput,
            cpu_util: self.cpu_util / n,
            timedout_frac,
            dropped_frac,
            total_failed_frac: timedout_frac + dropped_frac,
            drop_rate: self.drop_rate / n,
            resp_time,
        })
    }
}

/// Results of a completed sweep: one aggregated point per surviving sweep
/// value, ascending, plus the raw trial samples behind them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResults {
    /// Name of the swept simulator parameter
    pub variable: String,
    /// Axis label for the swept parameter
    pub label: String,
    /// Two-sided significance level the intervals were computed at
    pub confidence_error: f64,
    /// Aggregated points, ascending by sweep value
    pub points: Vec<AggregatedPoint>,
    /// Every successful trial across the sweep
    pub samples: TrialSamples,
}

impl SweepResults {
    #[must_use]
    pub fn new(variable: String, label: String, confidence_error: f64) -> Self {
        Self {
            variable,
            label,
            confidence_error,
            points: Vec::new(),
            samples: TrialSamples::default(),
        }
    }

    /// `(x, mean)` pairs for one metric across all points.
    #[must_use]
    pub fn series(&self, metric: SweepMetric) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.x, p.metric(metric))).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
