#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Neutral landscape generator producing clustered coffee / non-coffee maps.
//!
//! Every cell draws independent noise. A copy of that noise is repeatedly
//! replaced by the mean of each cell and its 8 neighbours, and the two
//! standardised fields are blended with the clustering coefficient as the
//! weight of the smoothed one. A coefficient of 0 leaves plain noise and 1
//! keeps only the smoothed field, so neighbour autocorrelation grows with the
//! coefficient. The blend is classified by rank so the realised class shares
//! match the requested proportions exactly.

use clr_landscape_core::{class_counts, validate_proportions, CellCoord, ConfigError, LandscapeParameters};
use clr_landscape_world::Landscape;
use rand::Rng;
use tracing::debug;

/// Neighbourhood-mean passes applied to the smoothed field.
pub const SMOOTHING_PASSES: usize = 8;

/// Reasons landscape generation may fail.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum LandscapeError {
    /// The grid must contain at least one cell per edge.
    #[error("landscape size must be positive")]
    NonPositiveSize,
    /// The clustering coefficient lies outside `[0, 1]`.
    #[error("cluster coefficient {0} is outside [0, 1]")]
    ClusterOutOfRange(f64),
    /// The land-cover proportions are unusable.
    #[error("invalid land-cover proportions: {0}")]
    Proportions(#[from] ConfigError),
}

/// Generates a landscape, allocating fresh scratch buffers.
///
/// Convenience wrapper around [`LandscapeGenerator::generate`].
pub fn generate<R: Rng + ?Sized>(
    size: u32,
    cluster: f64,
    proportions: &[f64],
    rng: &mut R,
) -> Result<Landscape, LandscapeError> {
    LandscapeGenerator::new().generate(size, cluster, proportions, rng)
}

/// Landscape generator that reuses its scratch buffers between runs.
#[derive(Debug, Default)]
pub struct LandscapeGenerator {
    noise: Vec<f64>,
    smoothed: Vec<f64>,
    scratch: Vec<f64>,
    field: Vec<f64>,
    tiebreak: Vec<u64>,
    order: Vec<usize>,
}

impl LandscapeGenerator {
    /// Creates a generator with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates a landscape described by `parameters`.
    pub fn generate_from<R: Rng + ?Sized>(
        &mut self,
        parameters: &LandscapeParameters,
        rng: &mut R,
    ) -> Result<Landscape, LandscapeError> {
        self.generate(
            parameters.size,
            parameters.cluster,
            &parameters.proportions,
            rng,
        )
    }

    /// Builds a spatially autocorrelated field and classifies it into cover
    /// classes. Class 0 is non-coffee; every other class carries coffee.
    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        size: u32,
        cluster: f64,
        proportions: &[f64],
        rng: &mut R,
    ) -> Result<Landscape, LandscapeError> {
        if size == 0 {
            return Err(LandscapeError::NonPositiveSize);
        }
        if !(0.0..=1.0).contains(&cluster) {
            return Err(LandscapeError::ClusterOutOfRange(cluster));
        }
        validate_proportions(proportions)?;

        self.build_field(size, cluster, rng);
        let classes = self.classify(proportions);
        let coffee = classes.into_iter().map(|class| class != 0).collect();
        let landscape =
            Landscape::from_cells(size, coffee).ok_or(LandscapeError::NonPositiveSize)?;
        debug!(
            size,
            cluster,
            coffee_cells = landscape.coffee_count(),
            "landscape generated"
        );
        Ok(landscape)
    }

    /// Fills `self.field` with the blended field and `self.tiebreak` with one
    /// random rank key per cell.
    fn build_field<R: Rng + ?Sized>(&mut self, size: u32, cluster: f64, rng: &mut R) {
        let edge = size as usize;
        let total = edge * edge;

        self.noise.clear();
        self.noise.extend((0..total).map(|_| rng.gen::<f64>()));
        self.tiebreak.clear();
        self.tiebreak.extend((0..total).map(|_| rng.gen::<u64>()));

        self.smoothed.clear();
        self.smoothed.extend_from_slice(&self.noise);
        for _ in 0..SMOOTHING_PASSES {
            self.scratch.clear();
            for index in 0..total {
                let mut sum = self.smoothed[index];
                let mut count = 1u32;
                for neighbor in neighbor_indices(index, size) {
                    sum += self.smoothed[neighbor];
                    count += 1;
                }
                self.scratch.push(sum / f64::from(count));
            }
            std::mem::swap(&mut self.smoothed, &mut self.scratch);
        }

        standardize(&mut self.noise);
        standardize(&mut self.smoothed);

        self.field.clear();
        self.field.extend(
            self.noise
                .iter()
                .zip(&self.smoothed)
                .map(|(noise, smooth)| (1.0 - cluster) * noise + cluster * smooth),
        );
    }

    /// Ranks the field and assigns cover classes so class shares match
    /// `proportions`. Equal field values are ordered by the random tiebreak.
    fn classify(&mut self, proportions: &[f64]) -> Vec<usize> {
        let total = self.field.len();
        self.order.clear();
        self.order.extend(0..total);
        let field = &self.field;
        let tiebreak = &self.tiebreak;
        self.order.sort_by(|a, b| {
            field[*a]
                .total_cmp(&field[*b])
                .then(tiebreak[*a].cmp(&tiebreak[*b]))
        });

        let mut classes = vec![0; total];
        let mut ranked = self.order.iter();
        for (class, count) in class_counts(proportions, total).into_iter().enumerate() {
            for index in ranked.by_ref().take(count) {
                classes[*index] = class;
            }
        }
        classes
    }
}

/// Shifts `values` to zero mean and, unless constant, unit variance.
fn standardize(values: &mut [f64]) {
    if values.is_empty() {
        return;
    }
    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let variance = values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / count;
    let deviation = variance.sqrt();
    for value in values.iter_mut() {
        *value -= mean;
        if deviation > 0.0 {
            *value /= deviation;
        }
    }
}

fn neighbor_indices(index: usize, size: u32) -> impl Iterator<Item = usize> {
    CellCoord::from_index(index, size)
        .into_iter()
        .flat_map(move |cell| cell.neighbors(size))
        .filter_map(move |neighbor| neighbor.index(size))
}
