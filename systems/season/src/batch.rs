//! Independent batch runs and parameter sweeps.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use clr_landscape_core::{CombinationLabel, ParameterSet, RunKey, SweepParameters};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::{run_season, RunResult, RunSink, SeasonError};

/// Shared flag requesting that no further runs start.
///
/// Runs already in progress finish normally.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of every batch observing this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Execution settings shared by every batch of a sweep.
#[derive(Clone, Debug)]
pub struct BatchOptions {
    /// Worker threads used to execute runs; one or zero runs sequentially.
    pub threads: usize,
    /// Token checked before each run starts.
    pub cancellation: CancellationToken,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            threads: 1,
            cancellation: CancellationToken::new(),
        }
    }
}

/// Runs of one parameter combination, ordered by run index.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BatchResult {
    /// Land-cover proportions shared by every run.
    pub proportions: Vec<f64>,
    /// Cluster coefficient shared by every run.
    pub cluster: f64,
    /// Completed runs.
    pub runs: Vec<RunResult>,
}

impl BatchResult {
    /// Label of the parameter combination.
    #[must_use]
    pub fn combination(&self) -> CombinationLabel<'_> {
        CombinationLabel::new(&self.proportions, self.cluster)
    }

    /// `(harvest, run)` pairs in run order.
    #[must_use]
    pub fn returns(&self) -> Vec<(f64, u32)> {
        self.runs
            .iter()
            .map(|result| (result.harvest, result.key.run))
            .collect()
    }

    /// Mean harvest across runs, or `None` for an empty batch.
    #[must_use]
    pub fn mean_harvest(&self) -> Option<f64> {
        if self.runs.is_empty() {
            return None;
        }
        let total: f64 = self.runs.iter().map(|result| result.harvest).sum();
        Some(total / self.runs.len() as f64)
    }
}

/// Batches of every combination in a sweep, proportions outermost.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SweepResult {
    /// One batch per parameter combination.
    pub batches: Vec<BatchResult>,
}

impl SweepResult {
    /// Batch for the given combination, if it was part of the sweep.
    #[must_use]
    pub fn get(&self, proportions: &[f64], cluster: f64) -> Option<&BatchResult> {
        self.batches.iter().find(|batch| {
            batch.proportions.as_slice() == proportions && batch.cluster.to_bits() == cluster.to_bits()
        })
    }
}

/// Executes `runs` independent seasons of the combination described by
/// `parameters.landscape`.
///
/// Each run generates its own landscape and population from streams derived
/// from the run key, so results do not depend on the number of threads or on
/// completion order.
///
/// When cancellation stops some runs from starting, the runs that finished
/// are persisted and returned inside [`SeasonError::Cancelled`].
pub fn run_batch(
    parameters: &ParameterSet,
    runs: u32,
    options: &BatchOptions,
    sink: &dyn RunSink,
) -> Result<BatchResult, SeasonError> {
    parameters.validate()?;

    let proportions = parameters.landscape.proportions.clone();
    let cluster = parameters.landscape.cluster;
    let label = CombinationLabel::new(&proportions, cluster);
    info!(combination = %label, runs, threads = options.threads, "batch started");

    let run_one = |run: u32| -> Result<Option<RunResult>, SeasonError> {
        if options.cancellation.is_cancelled() {
            return Ok(None);
        }
        let key = RunKey::new(proportions.clone(), cluster, run);
        run_season(parameters, key, sink).map(Some)
    };

    let outcomes: Vec<Result<Option<RunResult>, SeasonError>> =
        if options.threads <= 1 || runs <= 1 {
            (0..runs).map(run_one).collect()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(options.threads)
                .build()?;
            pool.install(|| (0..runs).into_par_iter().map(run_one).collect())
        };

    let mut completed = Vec::with_capacity(outcomes.len());
    let mut skipped = 0usize;
    for outcome in outcomes {
        match outcome? {
            Some(result) => completed.push(result),
            None => skipped += 1,
        }
    }
    completed.sort_by_key(|result| result.key.run);

    let batch = BatchResult {
        proportions: proportions.clone(),
        cluster,
        runs: completed,
    };
    if let Err(error) = sink.batch_completed(&batch) {
        warn!(combination = %label, %error, "batch returns not persisted");
    }

    if skipped > 0 {
        warn!(combination = %label, completed = batch.runs.len(), skipped, "batch cancelled");
        return Err(SeasonError::Cancelled {
            partial: Box::new(batch),
        });
    }

    info!(
        combination = %label,
        mean_harvest = batch.mean_harvest().unwrap_or(0.0),
        "batch finished"
    );
    Ok(batch)
}

/// Runs a batch of `parameters.season.runs` seasons for every combination
/// of `sweep`, keeping the rest of `parameters` fixed.
///
/// Every combination is validated before the first run starts.
pub fn run_sweep(
    parameters: &ParameterSet,
    sweep: &SweepParameters,
    options: &BatchOptions,
    sink: &dyn RunSink,
) -> Result<SweepResult, SeasonError> {
    parameters.validate()?;
    sweep.validate(&parameters.landscape)?;

    let mut result = SweepResult::default();
    for landscape in sweep.landscapes(&parameters.landscape) {
        let combination = ParameterSet {
            landscape,
            ..parameters.clone()
        };
        result.batches.push(run_batch(
            &combination,
            parameters.season.runs,
            options,
            sink,
        )?);
    }
    Ok(result)
}
