//! Best-effort persistence of run artefacts.

use std::{io, path::PathBuf, sync::Mutex};

use clr_landscape_core::{RunKey, SnapshotGrid};

use crate::{BatchResult, RunResult};

/// Failure reported by a [`RunSink`].
///
/// Sink failures are logged by the driver and never abort a run or batch.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Writing an artefact failed.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Artefact that could not be written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// An artefact could not be encoded.
    #[error("failed to encode {what}: {message}")]
    Encode {
        /// Artefact that could not be encoded.
        what: String,
        /// Encoder diagnostic.
        message: String,
    },
}

/// Receives the artefacts produced while runs execute.
///
/// Sinks are shared across worker threads when a batch runs in parallel.
pub trait RunSink: Sync {
    /// Persists a categorical snapshot captured during a run.
    fn snapshot(&self, key: &RunKey, grid: &SnapshotGrid) -> Result<(), SinkError>;

    /// Persists the metric trajectory and harvest of a finished run.
    fn run_completed(&self, result: &RunResult) -> Result<(), SinkError>;

    /// Persists the aggregated returns of a finished batch.
    fn batch_completed(&self, _batch: &BatchResult) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Sink that discards every artefact.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl RunSink for NullSink {
    fn snapshot(&self, _key: &RunKey, _grid: &SnapshotGrid) -> Result<(), SinkError> {
        Ok(())
    }

    fn run_completed(&self, _result: &RunResult) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Sink that keeps snapshots in memory, keyed by run.
#[derive(Debug, Default)]
pub struct MemorySink {
    snapshots: Mutex<Vec<(RunKey, SnapshotGrid)>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots received so far, in arrival order.
    #[must_use]
    pub fn snapshots(&self) -> Vec<(RunKey, SnapshotGrid)> {
        match self.snapshots.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl RunSink for MemorySink {
    fn snapshot(&self, key: &RunKey, grid: &SnapshotGrid) -> Result<(), SinkError> {
        let mut guard = match self.snapshots.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push((key.clone(), grid.clone()));
        Ok(())
    }

    fn run_completed(&self, _result: &RunResult) -> Result<(), SinkError> {
        Ok(())
    }
}
