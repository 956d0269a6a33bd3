use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

/// Errors raised while loading or validating an experiment configuration
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    Io { path: PathBuf, source: io::Error },
    /// The configuration file is not valid JSON
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// A driver-level field required by the selected mode is absent
    MissingField(&'static str),
    /// Sweep parameters that would not produce a finite, non-empty run
    InvalidSweep(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config {}: {source}", path.display())
            }
            ConfigError::Parse { path, source } => {
                write!(f, "invalid config {}: {source}", path.display())
            }
            ConfigError::MissingField(name) => {
                write!(f, "missing required config field `{name}`")
            }
            ConfigError::InvalidSweep(reason) => {
                write!(f, "invalid sweep configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors from a single simulator invocation
#[derive(Debug)]
pub enum SimClientError {
    /// The simulator executable could not be started
    Launch { program: PathBuf, source: io::Error },
    /// Pipe plumbing to or from the child failed
    Io(io::Error),
    /// The simulator exited with a non-zero status
    Failed { status: ExitStatus, stderr: String },
    /// The simulator exceeded the per-trial time limit and was killed
    Timeout { limit: Duration },
    /// The simulator's output was not a valid result record
    MalformedOutput(serde_json::Error),
}

impl fmt::Display for SimClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimClientError::Launch { program, source } => {
                write!(f, "failed to launch simulator {}: {source}", program.display())
            }
            SimClientError::Io(e) => write!(f, "simulator i/o error: {e}"),
            SimClientError::Failed { status, stderr } => {
                if stderr.is_empty() {
                    write!(f, "simulator exited with {status}")
                } else {
                    write!(f, "simulator exited with {status}: {stderr}")
                }
            }
            SimClientError::Timeout { limit } => {
                write!(f, "simulator killed after exceeding the {limit:?} trial timeout")
            }
            SimClientError::MalformedOutput(e) => {
                write!(f, "malformed simulator output: {e}")
            }
        }
    }
}

impl std::error::Error for SimClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimClientError::Launch { source, .. } => Some(source),
            SimClientError::Io(e) => Some(e),
            SimClientError::MalformedOutput(e) => Some(e),
            _ => None,
        }
    }
}

/// Errors from the statistics helpers
#[derive(Debug, Clone, PartialEq)]
pub enum StatsError {
    /// No samples were provided
    Empty,
    /// A sample standard deviation needs at least two samples
    Insufficient { n: usize },
    /// The two-sided significance level must lie strictly inside (0, 1)
    InvalidErrorRate(f64),
}

impl fmt::Display for StatsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsError::Empty => write!(f, "no samples provided"),
            StatsError::Insufficient { n } => {
                write!(f, "need at least two samples, got {n}")
            }
            StatsError::InvalidErrorRate(rate) => {
                write!(f, "error rate {rate} lies outside (0, 1)")
            }
        }
    }
}

impl std::error::Error for StatsError {}

/// Errors from chart rendering
#[derive(Debug)]
pub enum ChartError {
    /// A chart was requested for a series with no points
    EmptySeries { path: PathBuf },
    /// The drawing backend failed, including unwritable output paths
    Render { path: PathBuf, message: String },
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartError::EmptySeries { path } => {
                write!(f, "no data points to draw for {}", path.display())
            }
            ChartError::Render { path, message } => {
                write!(f, "failed to render {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for ChartError {}

/// Errors from a sweep or confidence run
#[derive(Debug)]
pub enum SweepError {
    /// The sweep specification failed validation before any trial ran
    InvalidSpec(ConfigError),
    /// A trial failed; `value` is absent for confidence-mode trials
    Trial {
        value: Option<f64>,
        trial: usize,
        source: SimClientError,
    },
    /// Aggregation statistics failed for a completed point
    Stats {
        value: Option<f64>,
        source: StatsError,
    },
    /// The run was cancelled by request
    Cancelled,
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepError::InvalidSpec(e) => write!(f, "{e}"),
            SweepError::Trial {
                value: Some(value),
                trial,
                source,
            } => {
                write!(f, "trial {trial} failed at sweep value {value}: {source}")
            }
            SweepError::Trial {
                value: None,
                trial,
                source,
            } => {
                write!(f, "trial {trial} failed on the base configuration: {source}")
            }
            SweepError::Stats {
                value: Some(value),
                source,
            } => {
                write!(f, "statistics failed at sweep value {value}: {source}")
            }
            SweepError::Stats {
                value: None,
                source,
            } => write!(f, "statistics failed: {source}"),
            SweepError::Cancelled => write!(f, "sweep cancelled"),
        }
    }
}

impl std::error::Error for SweepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SweepError::InvalidSpec(e) => Some(e),
            SweepError::Trial { source, .. } => Some(source),
            SweepError::Stats { source, .. } => Some(source),
            SweepError::Cancelled => None,
        }
    }
}

impl From<ConfigError> for SweepError {
    fn from(e: ConfigError) -> Self {
        SweepError::InvalidSpec(e)
    }
}
