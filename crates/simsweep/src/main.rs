use std::fs::{self, File};
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{WrapErr, eyre};
use simsweep_core::{
    ExperimentConfig, ExperimentDriver, ExperimentMode, SimulatorClient, SweepProgress,
};

mod logging;
mod report;

use logging::init_logging;
use report::ConsoleReporter;

#[derive(Parser, Debug)]
#[command(name = "simsweep")]
#[command(about = "Drive parameter sweeps against an external discrete-event simulator")]
struct Args {
    /// Path to the experiment configuration file
    config: PathBuf,

    /// Path to the simulator executable
    #[arg(short, long)]
    simulator: PathBuf,

    /// Override the configured output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(&args.log_level)?;

    let config = ExperimentConfig::load(&args.config)
        .wrap_err_with(|| format!("failed to load {}", args.config.display()))?;
    let output_dir = args
        .output_dir
        .unwrap_or_else(|| config.output_directory.clone());

    let client = SimulatorClient::new(&args.simulator).with_timeout(config.trial_timeout);
    let driver = ExperimentDriver::new(&client)
        .with_confidence_error(config.confidence_error)
        .with_failure_policy(config.on_trial_failure);
    let progress = SweepProgress::default();

    match &config.mode {
        ExperimentMode::Sweep(spec) => {
            tracing::info!(
                variable = %spec.variable,
                points = spec.values().len(),
                runs_per_point = spec.runs_per_point,
                simulator = %args.simulator.display(),
                "starting sweep"
            );
            let mut reporter = ConsoleReporter::new(&spec.variable, config.confidence_error);
            let results = driver.run_sweep(spec, &config.base, Some(&progress), |event| {
                reporter.handle(event);
            })?;
            tracing::info!(
                completed_trials = progress.completed(),
                points = results.len(),
                "sweep finished"
            );

            if results.is_empty() {
                return Err(eyre!("every sweep point was skipped; nothing to chart"));
            }

            fs::create_dir_all(&output_dir)
                .wrap_err_with(|| format!("failed to create {}", output_dir.display()))?;
            let charts = simsweep_core::render_sweep_charts(&results, &output_dir)?;

            let export = output_dir.join(format!("sweep_{}.json", results.variable));
            let file = File::create(&export)
                .wrap_err_with(|| format!("failed to create {}", export.display()))?;
            serde_json::to_writer_pretty(file, &results)?;

            report::print_sweep_summary(&charts, &export);
        }
        ExperimentMode::Confidence(spec) => {
            tracing::info!(
                trials = spec.trials,
                metric = ?spec.metric,
                simulator = %args.simulator.display(),
                "starting confidence run"
            );
            println!("Running {} trials", spec.trials);
            let mut reporter = ConsoleReporter::new(spec.metric.label(), config.confidence_error);
            let outcome = driver.run_confidence(spec, &config.base, Some(&progress), |event| {
                reporter.handle(event);
            })?;
            report::print_confidence(&outcome);
        }
    }

    Ok(())
}
