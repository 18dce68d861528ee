#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the crime forecast pipeline.
//!
//! Loads the incident archive, runs the full pipeline, prints the
//! aggregate report, and optionally exports the collapsed training
//! subset as CSV. Any fatal pipeline error aborts the run; no partial
//! results are printed.

use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use crime_forecast_dataset::write_training_csv;
use crime_forecast_pipeline::{PipelineConfig, PipelineOutput};

#[derive(Parser)]
#[command(name = "crime_forecast", about = "Short-horizon crime-type forecasting")]
struct Cli {
    /// Path to the incident archive (`.zip` containing one CSV) or a bare
    /// CSV file.
    #[arg(long)]
    data: PathBuf,

    /// Minimum training-subset frequency a category needs to keep its own
    /// label.
    #[arg(long)]
    threshold: Option<u64>,

    /// Number of simulated future periods.
    #[arg(long)]
    periods: Option<u32>,

    /// Synthetic incidents drawn per period.
    #[arg(long)]
    samples: Option<usize>,

    /// Trees in the random forest ensemble.
    #[arg(long)]
    trees: Option<usize>,

    /// Base seed for training and per-period sampling.
    #[arg(long)]
    seed: Option<u64>,

    /// Historical window override, in periods (derived from the data's
    /// month span when omitted).
    #[arg(long)]
    window: Option<usize>,

    /// Write the collapsed training subset as CSV to this path.
    #[arg(long)]
    export: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let cli = Cli::parse();

    let mut config = PipelineConfig::default();
    if let Some(threshold) = cli.threshold {
        config.collapse_threshold = threshold;
    }
    if let Some(periods) = cli.periods {
        config.periods = periods;
    }
    if let Some(samples) = cli.samples {
        config.samples_per_period = samples;
    }
    if let Some(trees) = cli.trees {
        config.n_trees = trees;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    config.historical_window = cli.window;

    let output = crime_forecast_pipeline::run(&cli.data, &config)?;

    print_report(&output);

    if let Some(path) = cli.export {
        let file = File::create(&path)?;
        write_training_csv(file, &output.training)?;
        log::info!(
            "Exported {} training records to {}",
            output.training.len(),
            path.display()
        );
    }

    Ok(())
}

/// Prints the aggregate report to stdout.
#[allow(clippy::cast_precision_loss)]
fn print_report(output: &PipelineOutput) {
    let report = &output.report;

    println!("Predicted crime types (all periods):");
    for total in &report.category_totals {
        println!("  {:<40} {}", total.category, total.count);
    }

    println!();
    println!(
        "Future volume vs historical average ({} records / {} periods = {:.1}):",
        report.training_size, report.historical_window, report.historical_average
    );
    for summary in &report.period_summaries {
        println!(
            "  period {:>2}: {:>6} predicted ({:+.1} vs baseline)",
            summary.period,
            summary.future_count,
            summary.future_count as f64 - summary.historical_average
        );
    }
}
