#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the coffee leaf rust landscape engine.
//!
//! This crate defines the message surface that connects the season driver,
//! the authoritative world, and pure systems. Systems read immutable views of
//! the world and respond with [`Command`] batches; the world executes those
//! commands via its `apply` entry point and reports what changed as [`Event`]
//! values. Records that leave the engine ([`DailyMetric`], [`SnapshotGrid`],
//! [`RunKey`]) are defined here so persistence adapters only depend on core.

mod parameters;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use parameters::{
    class_counts, validate_proportions, ConfigError, InfectionStage, LandscapeParameters,
    ParameterSet, PlantParameters, ProgressionTable, ScopeProbabilities, SeasonParameters,
    SpreadTuning, SweepParameters, WeatherParameters, PROPORTION_TOLERANCE,
};

/// Label of the random stream that drives landscape generation.
pub const RNG_STREAM_LANDSCAPE: &str = "landscape";
/// Label of the random stream that drives initial infection.
pub const RNG_STREAM_SEEDING: &str = "seeding";
/// Label of the random stream that drives daily weather draws.
pub const RNG_STREAM_WEATHER: &str = "weather";
/// Label of the random stream that drives the spread kernel.
pub const RNG_STREAM_SPREAD: &str = "spread";

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Advances every infected plant by one day of progression and refreshes
    /// its infectivity.
    AdvanceDay {
        /// Day of the season being simulated.
        day: u32,
    },
    /// Infects a healthy plant at the seed infection value.
    ///
    /// Ignored when the plant is already infected.
    SeedInfection {
        /// Plant that becomes infected.
        plant: PlantId,
    },
    /// Recomputes every plant's production multiplier and totals the harvest.
    Harvest,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    /// Confirms that infected plants progressed for the given day.
    DayAdvanced {
        /// Day of the season that was simulated.
        day: u32,
        /// Number of plants whose infection was updated.
        progressed: usize,
    },
    /// Confirms that a healthy plant became infected.
    PlantInfected {
        /// Identifier of the newly infected plant.
        plant: PlantId,
        /// Cell the plant resides in.
        cell: CellCoord,
    },
    /// Reports the season's total harvest.
    HarvestCompleted {
        /// Sum of harvested units across all plants.
        total: f64,
    },
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Row-major index of the cell within a square grid of edge `size`.
    ///
    /// Returns `None` when the cell lies outside the grid.
    #[must_use]
    pub fn index(&self, size: u32) -> Option<usize> {
        if self.column < size && self.row < size {
            let row = usize::try_from(self.row).ok()?;
            let column = usize::try_from(self.column).ok()?;
            let width = usize::try_from(size).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    /// Inverse of [`CellCoord::index`].
    #[must_use]
    pub fn from_index(index: usize, size: u32) -> Option<Self> {
        let width = usize::try_from(size).ok()?;
        if width == 0 || index >= width * width {
            return None;
        }
        let column = u32::try_from(index % width).ok()?;
        let row = u32::try_from(index / width).ok()?;
        Some(Self::new(column, row))
    }

    /// Reports whether `other` is one of the eight cells surrounding `self`.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        let columns = self.column.abs_diff(other.column);
        let rows = self.row.abs_diff(other.row);
        self != other && columns <= 1 && rows <= 1
    }

    /// Iterates the in-bounds cells of the 8-neighbourhood in row-major order.
    pub fn neighbors(self, size: u32) -> impl Iterator<Item = CellCoord> {
        const OFFSETS: [(i64, i64); 8] = [
            (-1, -1),
            (0, -1),
            (1, -1),
            (-1, 0),
            (1, 0),
            (-1, 1),
            (0, 1),
            (1, 1),
        ];
        let column = i64::from(self.column);
        let row = i64::from(self.row);
        let limit = i64::from(size);
        OFFSETS.into_iter().filter_map(move |(dx, dy)| {
            let x = column + dx;
            let y = row + dy;
            if (0..limit).contains(&x) && (0..limit).contains(&y) {
                Some(CellCoord::new(u32::try_from(x).ok()?, u32::try_from(y).ok()?))
            } else {
                None
            }
        })
    }
}

/// Unique identifier of a plant within one run's population arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlantId(u32);

impl PlantId {
    /// Creates a new plant identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Position of the plant within the population arena.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Spread scopes that the weather allows on a given day.
///
/// Scopes are nested: adjacent spread requires within-cell spread, and global
/// spread requires adjacent spread. Constructors enforce the nesting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct WeatherGate {
    within_cell: bool,
    adjacent: bool,
    global: bool,
}

impl WeatherGate {
    /// Gate with every scope closed.
    pub const CALM: Self = Self {
        within_cell: false,
        adjacent: false,
        global: false,
    };

    /// Creates a gate, closing any scope whose prerequisite scope is closed.
    #[must_use]
    pub const fn new(within_cell: bool, adjacent: bool, global: bool) -> Self {
        let adjacent = within_cell && adjacent;
        Self {
            within_cell,
            adjacent,
            global: adjacent && global,
        }
    }

    /// Whether spread inside a cell is possible today.
    #[must_use]
    pub const fn within_cell(&self) -> bool {
        self.within_cell
    }

    /// Whether spread into neighbouring cells is possible today.
    #[must_use]
    pub const fn adjacent(&self) -> bool {
        self.adjacent
    }

    /// Whether landscape-wide spread is possible today.
    #[must_use]
    pub const fn global(&self) -> bool {
        self.global
    }
}

/// Aggregate record describing the state of the epidemic after one day.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyMetric {
    /// Day of the season the record describes.
    pub day: u32,
    /// Sum of infectivity across all plants.
    pub infectivity_score: f64,
    /// Number of cells containing at least one infected plant.
    pub infected_cell_count: usize,
    /// Number of infected plants.
    pub infected_plant_count: usize,
}

/// Categorical state of a cell within a snapshot grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapshotCell {
    /// Cell without coffee.
    NonCoffee,
    /// Coffee cell whose plants are all healthy.
    CoffeeHealthy,
    /// Coffee cell with at least one infected plant.
    CoffeeInfected,
}

impl SnapshotCell {
    /// Integer code consumed by plotting collaborators.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::NonCoffee => 0,
            Self::CoffeeHealthy => 1,
            Self::CoffeeInfected => 2,
        }
    }
}

/// Categorical snapshot of the landscape on a given day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotGrid {
    day: u32,
    size: u32,
    cells: Vec<SnapshotCell>,
}

impl SnapshotGrid {
    /// Creates a snapshot from row-major cells of a square grid.
    #[must_use]
    pub fn new(day: u32, size: u32, cells: Vec<SnapshotCell>) -> Self {
        Self { day, size, cells }
    }

    /// Day after which the snapshot was captured.
    #[must_use]
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// Edge length of the grid.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Returns the state of the provided cell, if it lies inside the grid.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<SnapshotCell> {
        cell.index(self.size)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Iterates rows of integer codes from the top of the grid.
    pub fn rows(&self) -> impl Iterator<Item = Vec<u8>> + '_ {
        let width = (self.size as usize).max(1);
        self.cells
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.code()).collect())
    }

    /// Number of cells in the provided state.
    #[must_use]
    pub fn count(&self, state: SnapshotCell) -> usize {
        self.cells.iter().filter(|cell| **cell == state).count()
    }
}

/// Identifies one run within a parameter sweep.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunKey {
    /// Land-cover proportions used by the run.
    pub proportions: Vec<f64>,
    /// Clustering coefficient used by the run.
    pub cluster: f64,
    /// Zero-based index of the run within its batch.
    pub run: u32,
}

impl RunKey {
    /// Creates a key for run `run` of the given parameter combination.
    #[must_use]
    pub fn new(proportions: Vec<f64>, cluster: f64, run: u32) -> Self {
        Self {
            proportions,
            cluster,
            run,
        }
    }

    /// Key for the parameter combination, shared by every run of a batch.
    #[must_use]
    pub fn combination(&self) -> CombinationLabel<'_> {
        CombinationLabel {
            proportions: &self.proportions,
            cluster: self.cluster,
        }
    }
}

/// Display adapter rendering a `(proportions, cluster)` combination as
/// `[0.4, 0.6]-0.4`.
#[derive(Clone, Copy, Debug)]
pub struct CombinationLabel<'a> {
    proportions: &'a [f64],
    cluster: f64,
}

impl<'a> CombinationLabel<'a> {
    /// Creates a label for the provided combination.
    #[must_use]
    pub const fn new(proportions: &'a [f64], cluster: f64) -> Self {
        Self {
            proportions,
            cluster,
        }
    }
}

impl fmt::Display for CombinationLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (index, value) in self.proportions.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write_decimal(f, *value)?;
        }
        f.write_str("]-")?;
        write_decimal(f, self.cluster)
    }
}

fn write_decimal(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.fract() == 0.0 && value.is_finite() {
        write!(f, "{value:.1}")
    } else {
        write!(f, "{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::{CellCoord, CombinationLabel, DailyMetric, RunKey, SnapshotCell, SnapshotGrid, WeatherGate};

    #[test]
    fn neighbors_stay_in_bounds() {
        let corner: Vec<_> = CellCoord::new(0, 0).neighbors(4).collect();
        assert_eq!(
            corner,
            vec![CellCoord::new(1, 0), CellCoord::new(0, 1), CellCoord::new(1, 1)]
        );

        let interior: Vec<_> = CellCoord::new(1, 1).neighbors(4).collect();
        assert_eq!(interior.len(), 8);
        assert!(interior
            .iter()
            .all(|cell| CellCoord::new(1, 1).is_adjacent(*cell)));

        assert_eq!(CellCoord::new(0, 0).neighbors(1).count(), 0);
    }

    #[test]
    fn index_round_trips_within_grid() {
        let cell = CellCoord::new(3, 2);
        let index = cell.index(5).expect("cell inside grid");
        assert_eq!(index, 13);
        assert_eq!(CellCoord::from_index(index, 5), Some(cell));
        assert_eq!(CellCoord::new(5, 0).index(5), None);
        assert_eq!(CellCoord::from_index(25, 5), None);
    }

    #[test]
    fn weather_gate_enforces_nesting() {
        let gate = WeatherGate::new(false, true, true);
        assert_eq!(gate, WeatherGate::CALM);

        let gate = WeatherGate::new(true, false, true);
        assert!(gate.within_cell());
        assert!(!gate.adjacent());
        assert!(!gate.global());
    }

    #[test]
    fn combination_label_mirrors_list_notation() {
        let label = CombinationLabel::new(&[0.25, 0.75], 0.3).to_string();
        assert_eq!(label, "[0.25, 0.75]-0.3");

        let key = RunKey::new(vec![0.0, 1.0], 1.0, 2);
        assert_eq!(key.combination().to_string(), "[0.0, 1.0]-1.0");
    }

    #[test]
    fn snapshot_rows_emit_codes() {
        let grid = SnapshotGrid::new(
            0,
            2,
            vec![
                SnapshotCell::NonCoffee,
                SnapshotCell::CoffeeHealthy,
                SnapshotCell::CoffeeInfected,
                SnapshotCell::CoffeeHealthy,
            ],
        );
        let rows: Vec<_> = grid.rows().collect();
        assert_eq!(rows, vec![vec![0, 1], vec![2, 1]]);
        assert_eq!(grid.count(SnapshotCell::CoffeeHealthy), 2);
        assert_eq!(grid.cell(CellCoord::new(0, 1)), Some(SnapshotCell::CoffeeInfected));
    }

    #[test]
    fn daily_metric_round_trips_through_bincode() {
        let metric = DailyMetric {
            day: 42,
            infectivity_score: 1.25,
            infected_cell_count: 3,
            infected_plant_count: 7,
        };
        let bytes = bincode::serialize(&metric).expect("serialize");
        let restored: DailyMetric = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, metric);
    }
}
