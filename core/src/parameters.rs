//! Tunable parameter surface for a simulated coffee season.
//!
//! Every knob has a default equal to the calibrated coffee leaf rust model, so an
//! empty configuration file yields the reference experiment.

use serde::{Deserialize, Serialize};

/// Tolerance accepted when checking that land-cover proportions sum to one.
pub const PROPORTION_TOLERANCE: f64 = 1e-6;

/// Aggregated parameters controlling every adjustable aspect of a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParameterSet {
    /// Landscape dimensions, clustering, and land-cover proportions.
    pub landscape: LandscapeParameters,
    /// Per-plant population and yield parameters.
    pub plants: PlantParameters,
    /// Seasonal probabilities gating each spread scope.
    pub weather: WeatherParameters,
    /// Infection progression band table and latency window.
    pub progression: ProgressionTable,
    /// Score thresholds and draw counts used by the spread kernel.
    pub spread: SpreadTuning,
    /// Season length, snapshot cadence, run count, and base seed.
    pub season: SeasonParameters,
}

impl ParameterSet {
    /// Checks every parameter, returning the first violation encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.landscape.validate()?;
        self.plants.validate()?;
        self.weather.validate()?;
        self.progression.validate()?;
        self.spread.validate()?;
        self.season.validate()
    }
}

/// Neutral landscape model parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LandscapeParameters {
    /// Number of cells along each edge of the square grid.
    pub size: u32,
    /// Spatial autocorrelation in `[0, 1]`; zero yields uncorrelated noise.
    pub cluster: f64,
    /// Share of cells per cover class; class 0 is non-coffee, the rest coffee.
    pub proportions: Vec<f64>,
}

impl Default for LandscapeParameters {
    fn default() -> Self {
        Self {
            size: 40,
            cluster: 0.4,
            proportions: vec![0.4, 0.6],
        }
    }
}

impl LandscapeParameters {
    /// Total number of cells in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let edge = self.size as usize;
        edge * edge
    }

    /// Number of coffee cells the quantile classification will realise.
    #[must_use]
    pub fn coffee_cell_count(&self) -> usize {
        let total = self.cell_count();
        let counts = class_counts(&self.proportions, total);
        total - counts.first().copied().unwrap_or(total)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.size == 0 {
            return Err(ConfigError::NonPositiveSize);
        }
        if !(0.0..=1.0).contains(&self.cluster) {
            return Err(ConfigError::ClusterOutOfRange(self.cluster));
        }
        validate_proportions(&self.proportions)?;
        if self.coffee_cell_count() == 0 {
            return Err(ConfigError::NoCoffeeCells);
        }
        Ok(())
    }
}

/// Verifies that a land-cover proportion vector is usable for classification.
pub fn validate_proportions(proportions: &[f64]) -> Result<(), ConfigError> {
    if proportions.is_empty() {
        return Err(ConfigError::EmptyProportions);
    }
    if let Some(&value) = proportions
        .iter()
        .find(|value| !value.is_finite() || **value < 0.0)
    {
        return Err(ConfigError::NegativeProportion(value));
    }
    let sum: f64 = proportions.iter().sum();
    if (sum - 1.0).abs() > PROPORTION_TOLERANCE {
        return Err(ConfigError::ProportionsDoNotSumToOne(sum));
    }
    Ok(())
}

/// Splits `total` cells into per-class counts matching `proportions`.
///
/// Class boundaries are placed at the rounded cumulative shares so the counts
/// always sum to `total` and the last class absorbs any rounding remainder.
#[must_use]
pub fn class_counts(proportions: &[f64], total: usize) -> Vec<usize> {
    let mut counts = Vec::with_capacity(proportions.len());
    let mut cumulative = 0.0;
    let mut previous_boundary = 0usize;
    for (index, share) in proportions.iter().enumerate() {
        cumulative += share;
        let boundary = if index + 1 == proportions.len() {
            total
        } else {
            ((cumulative * total as f64).round() as usize).clamp(previous_boundary, total)
        };
        counts.push(boundary - previous_boundary);
        previous_boundary = boundary;
    }
    counts
}

/// Parameters describing the plants placed in each coffee cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlantParameters {
    /// Number of plants created in every coffee cell.
    pub plants_per_cell: u32,
    /// Harvested units produced by a fully healthy plant.
    pub max_production: f64,
    /// Multiplier applied to daily progression; 1 means no extra resistance.
    pub resistance: f64,
    /// Static per-plant cost carried for reporting.
    pub cost: u32,
}

impl Default for PlantParameters {
    fn default() -> Self {
        Self {
            plants_per_cell: 8,
            max_production: 4_000.0,
            resistance: 1.0,
            cost: 100,
        }
    }
}

impl PlantParameters {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.plants_per_cell == 0 {
            return Err(ConfigError::NoPlantsPerCell);
        }
        if !self.max_production.is_finite() || self.max_production < 0.0 {
            return Err(ConfigError::NegativeMaxProduction(self.max_production));
        }
        if !self.resistance.is_finite() || self.resistance <= 0.0 {
            return Err(ConfigError::NonPositiveResistance(self.resistance));
        }
        Ok(())
    }
}

/// Probabilities that each spread scope is favourable on a given day.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScopeProbabilities {
    /// Chance that conditions allow spread inside a cell.
    pub within_cell: f64,
    /// Chance, given within-cell spread, that spores reach adjacent cells.
    pub adjacent: f64,
    /// Chance, given adjacent spread, that spores travel across the landscape.
    pub global: f64,
}

impl ScopeProbabilities {
    fn validate(&self) -> Result<(), ConfigError> {
        for (scope, value) in [
            ("within_cell", self.within_cell),
            ("adjacent", self.adjacent),
            ("global", self.global),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ProbabilityOutOfRange { scope, value });
            }
        }
        Ok(())
    }
}

/// Seasonal weather parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeatherParameters {
    /// Scope probabilities before the wet season starts.
    pub dry: ScopeProbabilities,
    /// Scope probabilities from the wet season onward.
    pub wet: ScopeProbabilities,
    /// First day of the season that uses the wet probabilities.
    pub wet_season_start_day: u32,
}

impl Default for WeatherParameters {
    fn default() -> Self {
        Self {
            dry: ScopeProbabilities {
                within_cell: 0.2,
                adjacent: 0.6,
                global: 0.05,
            },
            wet: ScopeProbabilities {
                within_cell: 0.7,
                adjacent: 0.6,
                global: 0.05,
            },
            wet_season_start_day: 180,
        }
    }
}

impl WeatherParameters {
    /// Returns the probabilities in effect on `day`.
    #[must_use]
    pub fn for_day(&self, day: u32) -> &ScopeProbabilities {
        if day < self.wet_season_start_day {
            &self.dry
        } else {
            &self.wet
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.dry.validate()?;
        self.wet.validate()
    }
}

/// Conceptual infection stage implied by a continuous infection level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InfectionStage {
    /// No infection.
    Healthy,
    /// Infected but still inside the latency window; not transmissible.
    Subclinical,
    /// Past the latency window and transmitting.
    Infectious,
    /// Fully infected; progression stops for the season.
    Saturated,
}

/// Explicit band table driving daily infection progression.
///
/// Cutoffs are expressed in days and converted to infection units by
/// multiplying with [`ProgressionTable::base_rate`]. A plant whose infection
/// is below the first cutoff advances by the first scaling factor, below the
/// second by the second, and so on; beyond the last cutoff the fallback
/// scaling applies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProgressionTable {
    /// Infection gained by one day at unit scaling; also the seed infection value.
    pub base_rate: f64,
    /// Ascending band cutoffs measured in days of unit progression.
    pub cutoffs_days: Vec<f64>,
    /// Scaling factor for each band, aligned with `cutoffs_days`.
    pub scaling: Vec<f64>,
    /// Scaling applied once infection exceeds the last cutoff.
    pub fallback_scaling: f64,
    /// Latency window in days; plants below it are not infectious.
    pub latency_days: f64,
}

impl Default for ProgressionTable {
    fn default() -> Self {
        Self {
            base_rate: 1.0 / 365.0,
            cutoffs_days: vec![20.0, 40.0, 60.0, 120.0],
            scaling: vec![1.0, 4.0, 8.0, 16.0],
            fallback_scaling: 20.0,
            latency_days: 20.0,
        }
    }
}

impl ProgressionTable {
    /// Infection value assigned to a newly seeded plant.
    #[must_use]
    pub const fn seed_infection(&self) -> f64 {
        self.base_rate
    }

    /// Minimum infection level at which a plant becomes infectious.
    #[must_use]
    pub fn latency_threshold(&self) -> f64 {
        self.latency_days * self.base_rate
    }

    /// Index of the band containing `infection`, or `None` past the last cutoff.
    #[must_use]
    pub fn band(&self, infection: f64) -> Option<usize> {
        self.cutoffs_days
            .iter()
            .position(|cutoff| infection < cutoff * self.base_rate)
    }

    /// Scaling factor applied to a plant currently at `infection`.
    #[must_use]
    pub fn scaling_for(&self, infection: f64) -> f64 {
        self.band(infection)
            .and_then(|index| self.scaling.get(index).copied())
            .unwrap_or(self.fallback_scaling)
    }

    /// Infection after one day of progression, clamped to one.
    ///
    /// Healthy and saturated plants are returned unchanged.
    #[must_use]
    pub fn advance(&self, infection: f64, resistance: f64) -> f64 {
        if infection <= 0.0 || infection >= 1.0 {
            return infection;
        }
        let increment = self.base_rate * self.scaling_for(infection) * resistance;
        (infection + increment).min(1.0)
    }

    /// Classifies an infection level into its conceptual stage.
    #[must_use]
    pub fn stage(&self, infection: f64) -> InfectionStage {
        if infection <= 0.0 {
            InfectionStage::Healthy
        } else if infection >= 1.0 {
            InfectionStage::Saturated
        } else if infection < self.latency_threshold() {
            InfectionStage::Subclinical
        } else {
            InfectionStage::Infectious
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_rate.is_finite() || self.base_rate <= 0.0 || self.base_rate > 1.0 {
            return Err(ConfigError::InvalidBaseRate(self.base_rate));
        }
        if self.cutoffs_days.len() != self.scaling.len() {
            return Err(ConfigError::ProgressionTableMismatch {
                cutoffs: self.cutoffs_days.len(),
                scaling: self.scaling.len(),
            });
        }
        if self
            .cutoffs_days
            .windows(2)
            .any(|pair| pair[0] >= pair[1])
        {
            return Err(ConfigError::CutoffsNotAscending);
        }
        let negative_scaling = self
            .scaling
            .iter()
            .chain(std::iter::once(&self.fallback_scaling))
            .find(|value| !value.is_finite() || **value < 0.0);
        if let Some(&value) = negative_scaling {
            return Err(ConfigError::NegativeScaling(value));
        }
        if !self.latency_days.is_finite() || self.latency_days < 0.0 {
            return Err(ConfigError::NegativeLatency(self.latency_days));
        }
        Ok(())
    }
}

/// Thresholds and draw counts used by the three-tier spread kernel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpreadTuning {
    /// Minimum cell score before a healthy resident is seeded.
    pub within_cell_score: f64,
    /// Minimum cell score before a neighbouring plant may be seeded.
    pub adjacent_score: f64,
    /// Chance that an eligible cell seeds one neighbouring plant.
    pub adjacent_probability: f64,
    /// Minimum summed score across all cells before global seeding.
    pub global_score: f64,
    /// Healthy population that must be exceeded before global seeding.
    pub global_min_healthy: usize,
    /// Number of draws, with replacement, from the healthy pool per global event.
    pub global_draws: u32,
}

impl Default for SpreadTuning {
    fn default() -> Self {
        Self {
            within_cell_score: 0.4,
            adjacent_score: 0.6,
            adjacent_probability: 0.8,
            global_score: 0.5,
            global_min_healthy: 100,
            global_draws: 3,
        }
    }
}

impl SpreadTuning {
    fn validate(&self) -> Result<(), ConfigError> {
        for (tier, value) in [
            ("within_cell", self.within_cell_score),
            ("adjacent", self.adjacent_score),
            ("global", self.global_score),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidSpreadThreshold { tier, value });
            }
        }
        if !(0.0..=1.0).contains(&self.adjacent_probability) {
            return Err(ConfigError::ProbabilityOutOfRange {
                scope: "adjacent_spread",
                value: self.adjacent_probability,
            });
        }
        Ok(())
    }
}

/// Season length, persistence cadence, and batch parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeasonParameters {
    /// Number of simulated days per season.
    pub days: u32,
    /// Days after which a categorical snapshot is persisted.
    pub snapshot_days: Vec<u32>,
    /// Number of independent runs per batch.
    pub runs: u32,
    /// Base seed from which every run's random streams are derived.
    pub seed: u64,
}

impl Default for SeasonParameters {
    fn default() -> Self {
        Self {
            days: 365,
            snapshot_days: vec![0, 120, 240, 360],
            runs: 10,
            seed: 0x00c0_ffee_1eaf_0001,
        }
    }
}

impl SeasonParameters {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.days == 0 {
            return Err(ConfigError::EmptySeason);
        }
        Ok(())
    }
}

/// Grid of landscape configurations explored by a parameter sweep.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepParameters {
    /// Land-cover proportion vectors to explore.
    pub proportions: Vec<Vec<f64>>,
    /// Cluster coefficients to explore.
    pub clusters: Vec<f64>,
}

impl Default for SweepParameters {
    fn default() -> Self {
        Self {
            proportions: vec![vec![0.1, 0.9], vec![0.25, 0.75], vec![0.4, 0.6]],
            clusters: vec![0.2, 0.3, 0.4],
        }
    }
}

impl SweepParameters {
    /// Sweep consisting of the single landscape described by `landscape`.
    #[must_use]
    pub fn single(landscape: &LandscapeParameters) -> Self {
        Self {
            proportions: vec![landscape.proportions.clone()],
            clusters: vec![landscape.cluster],
        }
    }

    /// Number of parameter combinations in the sweep.
    #[must_use]
    pub fn len(&self) -> usize {
        self.proportions.len() * self.clusters.len()
    }

    /// Whether the sweep contains no combination.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Expands the sweep into one landscape configuration per combination,
    /// proportions outermost, keeping the grid size of `base`.
    #[must_use]
    pub fn landscapes(&self, base: &LandscapeParameters) -> Vec<LandscapeParameters> {
        self.proportions
            .iter()
            .flat_map(|proportions| {
                self.clusters.iter().map(move |cluster| LandscapeParameters {
                    size: base.size,
                    cluster: *cluster,
                    proportions: proportions.clone(),
                })
            })
            .collect()
    }

    /// Checks every combination against the grid size of `base`.
    pub fn validate(&self, base: &LandscapeParameters) -> Result<(), ConfigError> {
        if self.is_empty() {
            return Err(ConfigError::EmptySweep);
        }
        self.landscapes(base)
            .iter()
            .try_for_each(LandscapeParameters::validate)
    }
}

/// Reasons a parameter set is rejected before any run starts.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The grid must contain at least one cell per edge.
    #[error("grid size must be positive")]
    NonPositiveSize,
    /// The clustering coefficient lies outside `[0, 1]`.
    #[error("cluster coefficient {0} is outside [0, 1]")]
    ClusterOutOfRange(f64),
    /// No land-cover proportions were provided.
    #[error("land-cover proportions are empty")]
    EmptyProportions,
    /// A proportion was negative or not finite.
    #[error("land-cover proportion {0} is negative or not finite")]
    NegativeProportion(f64),
    /// The proportions do not sum to one.
    #[error("land-cover proportions sum to {0}, expected 1")]
    ProportionsDoNotSumToOne(f64),
    /// The configured landscape would contain no coffee cells.
    #[error("parameters yield zero coffee cells")]
    NoCoffeeCells,
    /// Every coffee cell must hold at least one plant.
    #[error("plants per cell must be positive")]
    NoPlantsPerCell,
    /// Maximum production was negative or not finite.
    #[error("max production {0} is negative or not finite")]
    NegativeMaxProduction(f64),
    /// Resistance was zero, negative, or not finite.
    #[error("resistance {0} must be positive")]
    NonPositiveResistance(f64),
    /// A probability lies outside `[0, 1]`.
    #[error("{scope} probability {value} is outside [0, 1]")]
    ProbabilityOutOfRange {
        /// Name of the offending probability.
        scope: &'static str,
        /// Value that was provided.
        value: f64,
    },
    /// The progression base rate must lie in `(0, 1]`.
    #[error("progression base rate {0} is outside (0, 1]")]
    InvalidBaseRate(f64),
    /// Cutoff and scaling tables have different lengths.
    #[error("progression table has {cutoffs} cutoffs but {scaling} scaling factors")]
    ProgressionTableMismatch {
        /// Number of cutoffs provided.
        cutoffs: usize,
        /// Number of scaling factors provided.
        scaling: usize,
    },
    /// Cutoffs must be strictly ascending.
    #[error("progression cutoffs must be strictly ascending")]
    CutoffsNotAscending,
    /// A scaling factor was negative or not finite.
    #[error("progression scaling {0} is negative or not finite")]
    NegativeScaling(f64),
    /// The latency window was negative or not finite.
    #[error("latency window {0} is negative or not finite")]
    NegativeLatency(f64),
    /// A spread score threshold was negative or not finite.
    #[error("{tier} score threshold {value} is negative or not finite")]
    InvalidSpreadThreshold {
        /// Spread tier the threshold gates.
        tier: &'static str,
        /// Value that was provided.
        value: f64,
    },
    /// A season must simulate at least one day.
    #[error("season must contain at least one day")]
    EmptySeason,
    /// A sweep must explore at least one combination.
    #[error("sweep contains no parameter combination")]
    EmptySweep,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert_eq!(ParameterSet::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_size() {
        let mut parameters = ParameterSet::default();
        parameters.landscape.size = 0;
        assert_eq!(parameters.validate(), Err(ConfigError::NonPositiveSize));
    }

    #[test]
    fn rejects_proportions_not_summing_to_one() {
        let mut parameters = ParameterSet::default();
        parameters.landscape.proportions = vec![0.5, 0.6];
        assert!(matches!(
            parameters.validate(),
            Err(ConfigError::ProportionsDoNotSumToOne(_))
        ));
    }

    #[test]
    fn rejects_landscape_without_coffee() {
        let mut parameters = ParameterSet::default();
        parameters.landscape.proportions = vec![1.0, 0.0];
        assert_eq!(parameters.validate(), Err(ConfigError::NoCoffeeCells));
    }

    #[test]
    fn rejects_mismatched_progression_table() {
        let mut parameters = ParameterSet::default();
        let _ = parameters.progression.scaling.pop();
        assert!(matches!(
            parameters.validate(),
            Err(ConfigError::ProgressionTableMismatch { cutoffs: 4, scaling: 3 })
        ));
    }

    #[test]
    fn class_counts_cover_every_cell() {
        let counts = class_counts(&[0.4, 0.6], 1_600);
        assert_eq!(counts, vec![640, 960]);

        let counts = class_counts(&[0.0, 1.0], 16);
        assert_eq!(counts, vec![0, 16]);

        let counts = class_counts(&[0.3, 0.3, 0.4], 7);
        assert_eq!(counts.iter().sum::<usize>(), 7);
    }

    #[test]
    fn bands_follow_cutoff_table() {
        let table = ProgressionTable::default();
        let day = table.base_rate;
        assert_eq!(table.band(day), Some(0));
        assert_eq!(table.band(25.0 * day), Some(1));
        assert_eq!(table.band(50.0 * day), Some(2));
        assert_eq!(table.band(100.0 * day), Some(3));
        assert_eq!(table.band(200.0 * day), None);
        assert!((table.scaling_for(200.0 * day) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn advance_clamps_and_skips_terminal_states() {
        let table = ProgressionTable::default();
        assert!((table.advance(0.0, 1.0)).abs() < f64::EPSILON);
        assert!((table.advance(1.0, 1.0) - 1.0).abs() < f64::EPSILON);
        assert!((table.advance(0.99, 1.0) - 1.0).abs() < f64::EPSILON);

        let seeded = table.seed_infection();
        let expected = seeded + table.base_rate;
        assert!((table.advance(seeded, 1.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn resistance_scales_increment() {
        let table = ProgressionTable::default();
        let seeded = table.seed_infection();
        let slowed = table.advance(seeded, 0.5);
        assert!((slowed - (seeded + 0.5 * table.base_rate)).abs() < 1e-12);
    }

    #[test]
    fn stages_track_latency_threshold() {
        let table = ProgressionTable::default();
        let threshold = table.latency_threshold();
        assert_eq!(table.stage(0.0), InfectionStage::Healthy);
        assert_eq!(table.stage(threshold / 2.0), InfectionStage::Subclinical);
        assert_eq!(table.stage(threshold), InfectionStage::Infectious);
        assert_eq!(table.stage(1.0), InfectionStage::Saturated);
    }

    #[test]
    fn weather_switches_to_wet_probabilities() {
        let weather = WeatherParameters::default();
        assert!((weather.for_day(179).within_cell - 0.2).abs() < f64::EPSILON);
        assert!((weather.for_day(180).within_cell - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let parsed: ParameterSet = toml::from_str(
            r#"
            [landscape]
            size = 12
            proportions = [0.25, 0.75]
            "#,
        )
        .expect("parse parameters");
        assert_eq!(parsed.landscape.size, 12);
        assert!((parsed.landscape.cluster - 0.4).abs() < f64::EPSILON);
        assert_eq!(parsed.plants, PlantParameters::default());
    }

    #[test]
    fn sweep_expands_proportions_outermost() {
        let sweep = SweepParameters::default();
        let landscapes = sweep.landscapes(&LandscapeParameters::default());
        assert_eq!(landscapes.len(), 9);
        assert_eq!(landscapes[0].proportions, vec![0.1, 0.9]);
        assert!((landscapes[1].cluster - 0.3).abs() < f64::EPSILON);
        assert_eq!(landscapes[3].proportions, vec![0.25, 0.75]);
        assert!(landscapes.iter().all(|landscape| landscape.size == 40));
        assert_eq!(sweep.validate(&LandscapeParameters::default()), Ok(()));
    }

    #[test]
    fn sweep_rejects_empty_and_invalid_combinations() {
        let base = LandscapeParameters::default();
        let empty = SweepParameters {
            proportions: Vec::new(),
            clusters: vec![0.4],
        };
        assert_eq!(empty.validate(&base), Err(ConfigError::EmptySweep));

        let bad_cluster = SweepParameters {
            proportions: vec![vec![0.5, 0.5]],
            clusters: vec![1.2],
        };
        assert_eq!(
            bad_cluster.validate(&base),
            Err(ConfigError::ClusterOutOfRange(1.2))
        );
    }

    #[test]
    fn spread_thresholds_must_be_finite_and_non_negative() {
        let mut parameters = ParameterSet::default();
        parameters.spread.adjacent_score = -0.1;
        assert_eq!(
            parameters.validate(),
            Err(ConfigError::InvalidSpreadThreshold {
                tier: "adjacent",
                value: -0.1
            })
        );

        let mut parameters = ParameterSet::default();
        parameters.spread.within_cell_score = f64::NAN;
        assert!(matches!(
            parameters.validate(),
            Err(ConfigError::InvalidSpreadThreshold {
                tier: "within_cell",
                ..
            })
        ));

        let mut parameters = ParameterSet::default();
        parameters.spread.global_score = f64::INFINITY;
        assert!(matches!(
            parameters.validate(),
            Err(ConfigError::InvalidSpreadThreshold { tier: "global", .. })
        ));

        let mut parameters = ParameterSet::default();
        parameters.spread.global_score = 0.0;
        assert_eq!(parameters.validate(), Ok(()));
    }
}
