#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Season driver: builds a run's landscape and population, seeds the initial
//! infection, steps the daily loop, and aggregates runs into batches and
//! parameter sweeps.
//!
//! Every run owns its random streams, derived from the base seed and the run
//! key, so batches may execute runs in parallel without changing results.

mod batch;
mod driver;
mod seeds;
mod sink;

use clr_landscape_core::ConfigError;
use clr_landscape_system_landscape::LandscapeError;

pub use batch::{run_batch, run_sweep, BatchOptions, BatchResult, CancellationToken, SweepResult};
pub use driver::{initial_infection, run_season, RunResult, SeasonRunner};
pub use seeds::{derive_run_seed, derive_stream_seed, RunStreams};
pub use sink::{MemorySink, NullSink, RunSink, SinkError};

/// Reasons a season, batch, or sweep cannot complete.
#[derive(Debug, thiserror::Error)]
pub enum SeasonError {
    /// Parameters were rejected before any run started.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// The landscape could not be generated.
    #[error("landscape generation failed: {0}")]
    Landscape(#[from] LandscapeError),
    /// The generated landscape holds no coffee plants.
    #[error("landscape contains no coffee plants")]
    NoCoffeeCells,
    /// No coffee plant has a plant in its 8-neighbour cells, so the initial
    /// adjacent pair cannot be seeded.
    #[error("no coffee plant has an occupied neighbouring cell")]
    NoAdjacentPlants,
    /// Cancellation was requested before every run started.
    #[error("batch cancelled after {} completed runs", .partial.runs.len())]
    Cancelled {
        /// Runs that finished before cancellation, in run order.
        partial: Box<BatchResult>,
    },
    /// The worker pool for parallel runs could not be created.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
