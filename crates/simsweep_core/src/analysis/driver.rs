//! The experiment driver: sweep enumeration, replicate trials, failure
//! policy, progress tracking, and the standalone confidence mode.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde::Serialize;

use crate::config::{BaseConfig, ConfidenceSpec, FailurePolicy, SweepSpec};
use crate::error::{SimClientError, SweepError};
use crate::simulator::{SimulationRequest, SimulatorClient};
use crate::stats::{self, ConfidenceInterval};

use super::SweepMetric;
use super::aggregate::{AggregatedPoint, SweepResults, TrialAccumulator, TrialSamples};

/// Progress tracking for a run, counted in completed trials.
///
/// Clones share the same counters, so one handle can drive the run while
/// another observes or cancels it from a different thread.
#[derive(Debug, Clone)]
pub struct SweepProgress {
    completed: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
    cancelled: Arc<AtomicBool>,
}

impl SweepProgress {
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            completed: Arc::new(AtomicUsize::new(0)),
            total: Arc::new(AtomicUsize::new(total)),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Trials completed so far.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    /// Total trials the run will attempt.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Record one completed trial.
    pub fn increment(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Restart the counters for a run of `total` trials.
    ///
    /// A cancellation request survives the reset.
    pub fn reset(&self, total: usize) {
        self.completed.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }

    /// Ask the driver to stop at the next trial boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl Default for SweepProgress {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Driver lifecycle notifications, delivered to the caller's observer.
///
/// The core emits events instead of printing; the binary decides what the
/// console shows.
#[derive(Debug)]
pub enum SweepEvent<'a> {
    /// A sweep point is about to run its trials
    PointStarted { index: usize, value: f64 },
    /// One replicate trial completed successfully
    TrialFinished { index: usize, trial: usize },
    /// A point finished and joined the series
    PointFinished {
        index: usize,
        point: &'a AggregatedPoint,
    },
    /// A point was abandoned under the skip policy
    PointSkipped {
        index: usize,
        value: f64,
        error: &'a SimClientError,
    },
}

/// Outcome of the standalone confidence mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceReport {
    pub metric: SweepMetric,
    pub trials: usize,
    pub confidence_error: f64,
    pub interval: ConfidenceInterval,
}

/// Walks an experiment against one simulator client.
///
/// The driver owns the run policy (significance level, failure handling)
/// but not the client or the configuration, so one driver can serve
/// several runs.
#[derive(Debug)]
pub struct ExperimentDriver<'a> {
    client: &'a SimulatorClient,
    confidence_error: f64,
    on_trial_failure: FailurePolicy,
}

impl<'a> ExperimentDriver<'a> {
    #[must_use]
    pub fn new(client: &'a SimulatorClient) -> Self {
        Self {
            client,
            confidence_error: 0.05,
            on_trial_failure: FailurePolicy::Halt,
        }
    }

    #[must_use]
    pub fn with_confidence_error(mut self, error_rate: f64) -> Self {
        self.confidence_error = error_rate;
        self
    }

    #[must_use]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_trial_failure = policy;
        self
    }

    /// Run the full sweep: one aggregated point per enumerated value, in
    /// ascending order.
    ///
    /// Progress is incremented once per completed trial. Cancellation is
    /// honored at the next trial boundary, after the in-flight child has
    /// been reaped. Under [`FailurePolicy::Skip`] a failing point is
    /// abandoned whole: none of its trials contribute to the results.
    pub fn run_sweep<F>(
        &self,
        spec: &SweepSpec,
        base: &BaseConfig,
        progress: Option<&SweepProgress>,
        mut on_event: F,
    ) -> Result<SweepResults, SweepError>
    where
        F: FnMut(SweepEvent<'_>),
    {
        spec.validate()?;
        let values = spec.values();

        if let Some(p) = progress {
            p.reset(values.len() * spec.runs_per_point);
        }

        let mut results = SweepResults::new(
            spec.variable.clone(),
            spec.label.clone(),
            self.confidence_error,
        );

        for (index, &value) in values.iter().enumerate() {
            on_event(SweepEvent::PointStarted { index, value });
            let request = SimulationRequest::for_sweep_value(base, spec, value);

            match self.aggregate_point(
                &request,
                value,
                index,
                spec.runs_per_point,
                progress,
                &mut on_event,
            ) {
                Ok((point, samples)) => {
                    results.samples.merge(&samples);
                    on_event(SweepEvent::PointFinished {
                        index,
                        point: &point,
                    });
                    results.points.push(point);
                }
                Err(SweepError::Trial { source, .. })
                    if self.on_trial_failure == FailurePolicy::Skip =>
                {
                    on_event(SweepEvent::PointSkipped {
                        index,
                        value,
                        error: &source,
                    });
                }
                Err(e) => return Err(e),
            }
        }

        Ok(results)
    }

    /// Run every replicate trial for one sweep point and aggregate them.
    fn aggregate_point<F>(
        &self,
        request: &SimulationRequest,
        value: f64,
        index: usize,
        runs_per_point: usize,
        progress: Option<&SweepProgress>,
        on_event: &mut F,
    ) -> Result<(AggregatedPoint, TrialSamples), SweepError>
    where
        F: FnMut(SweepEvent<'_>),
    {
        let mut acc = TrialAccumulator::new();
        let mut samples = TrialSamples::default();

        for trial in 0..runs_per_point {
            if let Some(p) = progress
                && p.is_cancelled()
            {
                return Err(SweepError::Cancelled);
            }
            let result = self.client.run(request).map_err(|source| SweepError::Trial {
                value: Some(value),
                trial,
                source,
            })?;
            acc.record(&result);
            samples.record(&result);
            if let Some(p) = progress {
                p.increment();
            }
            on_event(SweepEvent::TrialFinished { index, trial });
        }

        let point = acc
            .finish(value, self.confidence_error)
            .map_err(|source| SweepError::Stats {
                value: Some(value),
                source,
            })?;
        Ok((point, samples))
    }

    /// Replicate the unmodified base configuration `spec.trials` times and
    /// report one confidence interval on the chosen metric.
    ///
    /// Trial failures always halt here; there is no point to skip to.
    pub fn run_confidence<F>(
        &self,
        spec: &ConfidenceSpec,
        base: &BaseConfig,
        progress: Option<&SweepProgress>,
        mut on_event: F,
    ) -> Result<ConfidenceReport, SweepError>
    where
        F: FnMut(SweepEvent<'_>),
    {
        if let Some(p) = progress {
            p.reset(spec.trials);
        }
        let request = SimulationRequest::from_base(base);
        let mut samples = Vec::with_capacity(spec.trials);

        for trial in 0..spec.trials {
            if let Some(p) = progress
                && p.is_cancelled()
            {
                return Err(SweepError::Cancelled);
            }
            let result = self.client.run(&request).map_err(|source| SweepError::Trial {
                value: None,
                trial,
                source,
            })?;
            samples.push(spec.metric.extract(&result));
            if let Some(p) = progress {
                p.increment();
            }
            on_event(SweepEvent::TrialFinished { index: 0, trial });
        }

        let interval = stats::confidence_interval(&samples, self.confidence_error)
            .map_err(|source| SweepError::Stats {
                value: None,
                source,
            })?;

        Ok(ConfidenceReport {
            metric: spec.metric,
            trials: spec.trials,
            confidence_error: self.confidence_error,
            interval,
        })
    }
}
