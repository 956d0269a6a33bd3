//! Child-process client for the external discrete-event simulator.
//!
//! The simulator is a black box with a stdin/stdout contract: it reads one
//! JSON parameter object, runs to completion, writes one JSON result record,
//! and exits. One child process is spawned per trial; nothing is shared
//! between trials.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::config::{BaseConfig, SweepSpec};
use crate::error::SimClientError;

/// Interval between child liveness checks when a trial timeout is set.
const TIMEOUT_POLL: Duration = Duration::from_millis(10);

/// One serialized simulator invocation: the base parameters with the swept
/// variable substituted. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRequest {
    params: Map<String, Value>,
}

impl SimulationRequest {
    /// The base configuration as-is, with no substitution.
    #[must_use]
    pub fn from_base(base: &BaseConfig) -> Self {
        Self {
            params: base.params().clone(),
        }
    }

    /// The base configuration with `spec.variable` overwritten by `value`.
    ///
    /// Integral sweep domains emit a JSON integer so integer-typed simulator
    /// parameters deserialize cleanly on the other side.
    #[must_use]
    pub fn for_sweep_value(base: &BaseConfig, spec: &SweepSpec, value: f64) -> Self {
        let json = if spec.is_integral() && value.fract() == 0.0 {
            Value::Number(Number::from(value as i64))
        } else {
            Number::from_f64(value).map_or(Value::Null, Value::Number)
        };
        let mut params = base.params().clone();
        params.insert(spec.variable.clone(), json);
        Self { params }
    }

    #[must_use]
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// The single JSON document written to the simulator's stdin.
    #[must_use]
    pub fn to_json(&self) -> String {
        Value::Object(self.params.clone()).to_string()
    }
}

/// The record a simulator run writes to stdout. All fields are required.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub throughput: f64,
    pub goodput: f64,
    pub cpu_util: f64,
    pub resp_time: f64,
    pub timedout_frac: f64,
    pub dropped_frac: f64,
    pub drop_rate: f64,
}

/// Invokes the external simulator, one child process per trial.
#[derive(Debug, Clone)]
pub struct SimulatorClient {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl SimulatorClient {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    /// Kill a trial that runs longer than `limit` and report it as a
    /// [`SimClientError::Timeout`].
    #[must_use]
    pub fn with_timeout(mut self, limit: Option<Duration>) -> Self {
        self.timeout = limit;
        self
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run one trial: feed the request to the child's stdin, read stdout
    /// to end-of-stream, parse the result record.
    ///
    /// Each pipe is pumped from its own thread, so a child that never
    /// drains stdin or floods an output pipe cannot stall the deadline
    /// poll. The child is always reaped before this returns, on every path.
    pub fn run(&self, request: &SimulationRequest) -> Result<SimulationResult, SimClientError> {
        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| SimClientError::Launch {
                program: self.program.clone(),
                source,
            })?;

        let payload = request.to_json();
        let writer = child
            .stdin
            .take()
            .map(|mut stdin| thread::spawn(move || stdin.write_all(payload.as_bytes())));
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        // A killed trial reports as a timeout; its pump threads unblock on
        // their own once the dead child's pipe ends close.
        if let Some(limit) = self.timeout {
            wait_with_deadline(&mut child, limit)?;
        }
        let status = child.wait().map_err(SimClientError::Io)?;

        // The child exited, so the pipes are at end-of-stream and these
        // joins do not block.
        let stdout = stdout.and_then(|h| h.join().ok()).unwrap_or_default();
        let stderr = stderr.and_then(|h| h.join().ok()).unwrap_or_default();
        let written = match writer {
            Some(handle) => handle.join().unwrap_or(Ok(())),
            None => Ok(()),
        };

        // A child that exits without draining stdin surfaces as a broken
        // pipe; its exit status tells the real story.
        if let Err(e) = written
            && e.kind() != io::ErrorKind::BrokenPipe
        {
            return Err(SimClientError::Io(e));
        }
        if !status.success() {
            return Err(SimClientError::Failed {
                status,
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }
        serde_json::from_slice(&stdout).map_err(SimClientError::MalformedOutput)
    }
}

/// Poll the child until it exits or the deadline passes, killing and
/// reaping it in the latter case.
fn wait_with_deadline(child: &mut Child, limit: Duration) -> Result<(), SimClientError> {
    let deadline = Instant::now() + limit;
    loop {
        match child.try_wait().map_err(SimClientError::Io)? {
            Some(_) => return Ok(()),
            None if Instant::now() >= deadline => {
                child.kill().map_err(SimClientError::Io)?;
                child.wait().map_err(SimClientError::Io)?;
                return Err(SimClientError::Timeout { limit });
            }
            None => thread::sleep(TIMEOUT_POLL),
        }
    }
}

/// Read a pipe to end-of-stream on its own thread.
fn drain(mut source: impl io::Read + Send + 'static) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = source.read_to_end(&mut buf);
        buf
    })
}
