//! Experiment configuration loaded from TOML and command-line overrides.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use clr_landscape_core::{ParameterSet, SweepParameters};
use serde::Deserialize;

/// Contents of an experiment configuration file.
///
/// ```toml
/// [parameters.landscape]
/// size = 40
///
/// [sweep]
/// proportions = [[0.1, 0.9], [0.4, 0.6]]
/// clusters = [0.2, 0.4]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ExperimentConfig {
    /// Model parameters shared by every run.
    pub(crate) parameters: ParameterSet,
    /// Landscape combinations to explore; absent means the single landscape
    /// described by `parameters.landscape`.
    pub(crate) sweep: Option<SweepParameters>,
}

/// Command-line values that take precedence over the configuration file.
#[derive(Clone, Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) runs: Option<u32>,
    pub(crate) seed: Option<u64>,
    pub(crate) size: Option<u32>,
}

impl ExperimentConfig {
    /// Reads the configuration at `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse configuration {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub(crate) fn apply(&mut self, overrides: &Overrides) {
        if let Some(runs) = overrides.runs {
            self.parameters.season.runs = runs;
        }
        if let Some(seed) = overrides.seed {
            self.parameters.season.seed = seed;
        }
        if let Some(size) = overrides.size {
            self.parameters.landscape.size = size;
        }
    }

    /// Sweep to execute, falling back to the configured single landscape.
    pub(crate) fn sweep(&self) -> SweepParameters {
        self.sweep
            .clone()
            .unwrap_or_else(|| SweepParameters::single(&self.parameters.landscape))
    }
}
