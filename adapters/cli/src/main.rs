#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs coffee leaf rust landscape experiments and
//! writes their artefacts for plotting.

mod config;
mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use clr_landscape_system_season::{run_sweep, BatchOptions, CancellationToken};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{ExperimentConfig, Overrides},
    output::{write_summary, CsvDirectorySink},
};

/// Simulates coffee leaf rust spread over generated landscapes.
#[derive(Debug, Parser)]
#[command(name = "clr-landscape", version, about)]
struct Args {
    /// TOML file with `[parameters]` and optional `[sweep]` tables.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Directory receiving maps, metric tables, returns, and the summary.
    #[arg(short, long, default_value = "data")]
    output: PathBuf,
    /// Runs per parameter combination.
    #[arg(long)]
    runs: Option<u32>,
    /// Base seed for every run's random streams.
    #[arg(long)]
    seed: Option<u64>,
    /// Worker threads executing runs; 1 runs sequentially.
    #[arg(long, default_value_t = 1)]
    threads: usize,
    /// Cells along each landscape edge.
    #[arg(long)]
    size: Option<u32>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let args = Args::parse();
    let mut config = ExperimentConfig::load(args.config.as_deref())?;
    config.apply(&Overrides {
        runs: args.runs,
        seed: args.seed,
        size: args.size,
    });
    config
        .parameters
        .validate()
        .context("invalid model parameters")?;
    let sweep = config.sweep();
    sweep
        .validate(&config.parameters.landscape)
        .context("invalid sweep")?;

    let sink = CsvDirectorySink::create(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    let options = BatchOptions {
        threads: args.threads,
        cancellation: CancellationToken::new(),
    };

    info!(
        combinations = sweep.len(),
        runs = config.parameters.season.runs,
        seed = config.parameters.season.seed,
        output = %args.output.display(),
        "experiment started"
    );
    let result = run_sweep(&config.parameters, &sweep, &options, &sink)?;

    let summary = args.output.join("summary.json");
    write_summary(&summary, &result)
        .with_context(|| format!("failed to write {}", summary.display()))?;
    for batch in &result.batches {
        info!(
            combination = %batch.combination(),
            mean_harvest = batch.mean_harvest().unwrap_or(0.0),
            "batch summary"
        );
    }
    Ok(())
}
