//! Configuration loading, key stripping, and validation.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::NamedTempFile;

use crate::analysis::SweepMetric;
use crate::config::{ExperimentConfig, ExperimentMode, FailurePolicy, SweepSpec};
use crate::error::ConfigError;

fn load(json: &str) -> Result<ExperimentConfig, ConfigError> {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    ExperimentConfig::load(file.path())
}

fn spec(start: f64, end: f64, step: f64) -> SweepSpec {
    SweepSpec {
        variable: "n_users".to_string(),
        label: "n_users".to_string(),
        start,
        end,
        step,
        runs_per_point: 3,
    }
}

#[test]
fn sweep_values_enumerate_the_half_open_range() {
    assert_eq!(spec(0.0, 10.0, 2.0).values(), vec![0.0, 2.0, 4.0, 6.0, 8.0]);
}

#[test]
fn sweep_values_exclude_the_end_bound() {
    // 0, 5, 10 would land exactly on end at 15
    assert_eq!(spec(0.0, 15.0, 5.0).values(), vec![0.0, 5.0, 10.0]);
}

#[test]
fn fractional_steps_do_not_drift() {
    // a running sum of 0.1 ends just below 1.0 and would yield an 11th value
    let values = spec(0.0, 1.0, 0.1).values();
    assert_eq!(values.len(), 10);
    assert!((values[9] - 0.9).abs() < 1e-12);
}

#[test]
fn integral_domains_are_detected() {
    assert!(spec(10.0, 100.0, 5.0).is_integral());
    assert!(!spec(0.5, 4.0, 1.0).is_integral());
    assert!(!spec(0.0, 1.0, 0.25).is_integral());
}

#[test]
fn sweep_config_strips_driver_keys() {
    let config = load(
        r#"{
            "variable": "n_users",
            "start": 10, "end": 50, "step": 10,
            "runs_per_point": 4,
            "output_directory": "out",
            "n_cpu": 4,
            "quantum": 0.5,
            "think_time_mean": 8.0
        }"#,
    )
    .unwrap();

    let ExperimentMode::Sweep(spec) = &config.mode else {
        panic!("expected sweep mode");
    };
    assert_eq!(spec.variable, "n_users");
    assert_eq!(spec.runs_per_point, 4);
    assert_eq!(config.output_directory, PathBuf::from("out"));

    assert_eq!(config.base.len(), 3);
    assert!(config.base.get("n_cpu").is_some());
    assert!(config.base.get("variable").is_none());
    assert!(config.base.get("start").is_none());
    assert!(config.base.get("runs_per_point").is_none());
    assert!(config.base.get("output_directory").is_none());
}

#[test]
fn defaults_apply_when_keys_are_absent() {
    let config = load(r#"{"variable": "n_users", "start": 0, "end": 10, "step": 2}"#).unwrap();
    let ExperimentMode::Sweep(spec) = &config.mode else {
        panic!("expected sweep mode");
    };
    assert_eq!(spec.runs_per_point, 3);
    assert_eq!(spec.label, "n_users");
    assert_eq!(config.confidence_error, 0.05);
    assert_eq!(config.on_trial_failure, FailurePolicy::Halt);
    assert_eq!(config.trial_timeout, None);
    assert_eq!(config.output_directory, PathBuf::from("."));
}

#[test]
fn label_overrides_the_variable_name() {
    let config = load(
        r#"{"variable": "n_users", "label": "Number of Users", "start": 0, "end": 10, "step": 2}"#,
    )
    .unwrap();
    let ExperimentMode::Sweep(spec) = &config.mode else {
        panic!("expected sweep mode");
    };
    assert_eq!(spec.label, "Number of Users");
}

#[test]
fn confidence_mode_needs_no_sweep_keys() {
    let config =
        load(r#"{"mode": "confidence", "confidence_trials": 12, "n_users": 40}"#).unwrap();
    let ExperimentMode::Confidence(spec) = &config.mode else {
        panic!("expected confidence mode");
    };
    assert_eq!(spec.trials, 12);
    assert_eq!(spec.metric, SweepMetric::RespTime);
    assert_eq!(config.base.get("n_users"), Some(&serde_json::json!(40)));
}

#[test]
fn confidence_metric_is_selectable() {
    let config = load(r#"{"mode": "confidence", "confidence_metric": "throughput"}"#).unwrap();
    let ExperimentMode::Confidence(spec) = &config.mode else {
        panic!("expected confidence mode");
    };
    assert_eq!(spec.metric, SweepMetric::Throughput);
    assert_eq!(spec.trials, 30);
}

#[test]
fn sweep_mode_requires_the_variable() {
    let err = load(r#"{"start": 0, "end": 10, "step": 2}"#).unwrap_err();
    assert!(matches!(err, ConfigError::MissingField("variable")));
}

#[test]
fn sweep_mode_requires_the_bounds() {
    let err = load(r#"{"variable": "q", "end": 10, "step": 2}"#).unwrap_err();
    assert!(matches!(err, ConfigError::MissingField("start")));
    let err = load(r#"{"variable": "q", "start": 0, "step": 2}"#).unwrap_err();
    assert!(matches!(err, ConfigError::MissingField("end")));
    let err = load(r#"{"variable": "q", "start": 0, "end": 10}"#).unwrap_err();
    assert!(matches!(err, ConfigError::MissingField("step")));
}

#[test]
fn zero_step_is_rejected_before_any_trial() {
    let err = load(r#"{"variable": "q", "start": 0, "end": 10, "step": 0}"#).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidSweep(_)));
}

#[test]
fn wrong_signed_step_is_rejected() {
    let err = load(r#"{"variable": "q", "start": 0, "end": 10, "step": -1}"#).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidSweep(_)));
}

#[test]
fn an_empty_domain_is_rejected() {
    let err = load(r#"{"variable": "q", "start": 10, "end": 10, "step": 1}"#).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidSweep(_)));
}

#[test]
fn zero_replicates_are_rejected() {
    let err =
        load(r#"{"variable": "q", "start": 0, "end": 10, "step": 1, "runs_per_point": 0}"#)
            .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidSweep(_)));
}

#[test]
fn confidence_error_outside_the_unit_interval_is_rejected() {
    for bad in ["0", "1", "1.5", "-0.05"] {
        let json = format!(
            r#"{{"variable": "q", "start": 0, "end": 10, "step": 1, "confidence_error": {bad}}}"#
        );
        let err = load(&json).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSweep(_)), "accepted {bad}");
    }
}

#[test]
fn the_timeout_key_becomes_a_duration() {
    let config =
        load(r#"{"variable": "q", "start": 0, "end": 4, "step": 1, "trial_timeout_secs": 2.5}"#)
            .unwrap();
    assert_eq!(config.trial_timeout, Some(Duration::from_millis(2500)));
}

#[test]
fn a_non_positive_timeout_is_rejected() {
    let err =
        load(r#"{"variable": "q", "start": 0, "end": 4, "step": 1, "trial_timeout_secs": 0}"#)
            .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidSweep(_)));
}

#[test]
fn an_oversized_timeout_is_rejected() {
    // a Duration cannot hold 1e300 seconds; the load must fail, not panic
    let err = load(
        r#"{"variable": "q", "start": 0, "end": 4, "step": 1, "trial_timeout_secs": 1e300}"#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidSweep(_)));
}

#[test]
fn the_skip_policy_parses() {
    let config =
        load(r#"{"variable": "q", "start": 0, "end": 4, "step": 1, "on_trial_failure": "skip"}"#)
            .unwrap();
    assert_eq!(config.on_trial_failure, FailurePolicy::Skip);
}

#[test]
fn an_unreadable_file_reports_io() {
    let err = ExperimentConfig::load(Path::new("/nonexistent/simsweep.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn invalid_json_reports_parse() {
    let err = load("this is not json").unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn validate_rejects_non_finite_bounds() {
    let mut s = spec(0.0, 10.0, 1.0);
    s.end = f64::NAN;
    assert!(s.validate().is_err());
    s.end = f64::INFINITY;
    assert!(s.validate().is_err());
}

#[test]
fn values_of_an_invalid_spec_are_empty() {
    assert!(spec(10.0, 0.0, 1.0).values().is_empty());
    assert!(spec(0.0, 10.0, 0.0).values().is_empty());
}
