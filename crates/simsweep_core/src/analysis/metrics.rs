//! Metric vocabulary for sweep aggregation and chart labeling.

use serde::{Deserialize, Serialize};

use crate::simulator::SimulationResult;

/// Per-trial metrics tracked across a sweep.
///
/// `Badput` and `TotalFailedFrac` are derived from the raw result record;
/// everything else is reported directly by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepMetric {
    RespTime,
    Throughput,
    Goodput,
    Badput,
    CpuUtil,
    TimedoutFrac,
    DroppedFrac,
    TotalFailedFrac,
    DropRate,
}

impl SweepMetric {
    /// Every metric, in report order.
    pub const ALL: [SweepMetric; 9] = [
        SweepMetric::RespTime,
        SweepMetric::Throughput,
        SweepMetric::Goodput,
        SweepMetric::Badput,
        SweepMetric::CpuUtil,
        SweepMetric::TimedoutFrac,
        SweepMetric::DroppedFrac,
        SweepMetric::TotalFailedFrac,
        SweepMetric::DropRate,
    ];

    /// Chart title and legend text.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            SweepMetric::RespTime => "Response Time",
            SweepMetric::Throughput => "Throughput",
            SweepMetric::Goodput => "Goodput",
            SweepMetric::Badput => "Badput",
            SweepMetric::CpuUtil => "CPU Utilization",
            SweepMetric::TimedoutFrac => "Timedout",
            SweepMetric::DroppedFrac => "Dropped",
            SweepMetric::TotalFailedFrac => "Total failed",
            SweepMetric::DropRate => "Drop Rate",
        }
    }

    /// Filename stem for chart outputs.
    #[must_use]
    pub const fn short_label(&self) -> &'static str {
        match self {
            SweepMetric::RespTime => "resp",
            SweepMetric::Throughput => "tput",
            SweepMetric::Goodput => "gput",
            SweepMetric::Badput => "bput",
            SweepMetric::CpuUtil => "util",
            SweepMetric::TimedoutFrac => "tfrac",
            SweepMetric::DroppedFrac => "dfrac",
            SweepMetric::TotalFailedFrac => "ffracs",
            SweepMetric::DropRate => "drate",
        }
    }

    /// Extract this metric from one trial's result record.
    #[must_use]
    pub fn extract(&self, result: &SimulationResult) -> f64 {
        match self {
            SweepMetric::RespTime => result.resp_time,
            SweepMetric::Throughput => result.throughput,
            SweepMetric::Goodput => result.goodput,
            SweepMetric::Badput => result.throughput - result.goodput,
            SweepMetric::CpuUtil => result.cpu_util,
            SweepMetric::TimedoutFrac => result.timedout_frac,
            SweepMetric::DroppedFrac => result.dropped_frac,
            SweepMetric::TotalFailedFrac => result.timedout_frac + result.dropped_frac,
            SweepMetric::DropRate => result.drop_rate,
        }
    }
}
