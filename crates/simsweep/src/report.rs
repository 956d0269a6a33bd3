//! Console narration for sweep and confidence runs.
//!
//! Run progress goes to stdout: a header per sweep point, one dot per
//! trial, and the response-time interval once a point completes.
//! Diagnostics go through tracing to stderr so the narration stays
//! machine-readable.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use simsweep_core::{ConfidenceReport, SweepEvent};

pub struct ConsoleReporter {
    variable: String,
    confidence_error: f64,
}

impl ConsoleReporter {
    pub fn new(variable: &str, confidence_error: f64) -> Self {
        Self {
            variable: variable.to_string(),
            confidence_error,
        }
    }

    pub fn handle(&mut self, event: SweepEvent<'_>) {
        let _ = self.write_event(&mut io::stdout(), event);
    }

    /// Headers and dots are flushed as they land so progress is visible
    /// while a point's trials are still running.
    fn write_event(&self, out: &mut impl Write, event: SweepEvent<'_>) -> io::Result<()> {
        match event {
            SweepEvent::PointStarted { value, .. } => {
                write!(out, "{} = {value}", self.variable)?;
                out.flush()
            }
            SweepEvent::TrialFinished { .. } => {
                write!(out, " .")?;
                out.flush()
            }
            SweepEvent::PointFinished { point, .. } => {
                writeln!(
                    out,
                    "\nAverage response time = {} ± {} with {:.0}% confidence",
                    point.resp_time.mean,
                    point.resp_time.half_width(),
                    (1.0 - self.confidence_error) * 100.0,
                )
            }
            SweepEvent::PointSkipped { value, error, .. } => {
                writeln!(out)?;
                tracing::warn!(value, %error, "sweep point skipped");
                Ok(())
            }
        }
    }
}

/// Final summary once the charts and the results export are on disk.
pub fn print_sweep_summary(charts: &[PathBuf], export: &Path) {
    let _ = write_sweep_summary(&mut io::stdout(), charts, export);
}

fn write_sweep_summary(out: &mut impl Write, charts: &[PathBuf], export: &Path) -> io::Result<()> {
    writeln!(out, "\nComplete! Wrote {} charts:", charts.len())?;
    for path in charts {
        writeln!(out, "  {}", path.display())?;
    }
    writeln!(out, "Aggregates saved to {}", export.display())
}

/// Standalone confidence-mode summary.
pub fn print_confidence(report: &ConfidenceReport) {
    let _ = write_confidence(&mut io::stdout(), report);
}

fn write_confidence(out: &mut impl Write, report: &ConfidenceReport) -> io::Result<()> {
    writeln!(
        out,
        "\n{:.0}% confidence interval of {} over {} trials: {} {}",
        (1.0 - report.confidence_error) * 100.0,
        report.metric.label(),
        report.trials,
        report.interval.lower,
        report.interval.upper,
    )?;
    writeln!(
        out,
        "Mean = {} ± {}",
        report.interval.mean,
        report.interval.half_width()
    )
}
