//! Per-plant infection state.

use clr_landscape_core::{CellCoord, InfectionStage, PlantParameters, ProgressionTable};

/// Simulated coffee tree resident in a coffee cell.
///
/// Infection only ever grows within a run: there is no recovery and no removal.
#[derive(Clone, Debug, PartialEq)]
pub struct Plant {
    cell: CellCoord,
    local_index: u32,
    infection: f64,
    infectivity: f64,
    production: f64,
    resistance: f64,
    cost: u32,
}

impl Plant {
    /// Creates a healthy plant at full production.
    #[must_use]
    pub fn new(cell: CellCoord, local_index: u32, parameters: &PlantParameters) -> Self {
        Self {
            cell,
            local_index,
            infection: 0.0,
            infectivity: 0.0,
            production: 1.0,
            resistance: parameters.resistance,
            cost: parameters.cost,
        }
    }

    /// Cell the plant resides in.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Index of the plant within its cell.
    #[must_use]
    pub const fn local_index(&self) -> u32 {
        self.local_index
    }

    /// Infection level in `[0, 1]`.
    #[must_use]
    pub const fn infection(&self) -> f64 {
        self.infection
    }

    /// Contagiousness derived from the infection level.
    #[must_use]
    pub const fn infectivity(&self) -> f64 {
        self.infectivity
    }

    /// Production multiplier derived at harvest.
    #[must_use]
    pub const fn production(&self) -> f64 {
        self.production
    }

    /// Static resistance factor scaling daily progression.
    #[must_use]
    pub const fn resistance(&self) -> f64 {
        self.resistance
    }

    /// Static cost carried for reporting.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Whether the plant has never been infected.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.infection <= 0.0
    }

    /// Whether the plant carries any infection.
    #[must_use]
    pub fn is_infected(&self) -> bool {
        self.infection > 0.0
    }

    /// Conceptual stage of the plant under the provided band table.
    #[must_use]
    pub fn stage(&self, table: &ProgressionTable) -> InfectionStage {
        table.stage(self.infection)
    }

    /// Sets a healthy plant to the seed infection value.
    ///
    /// Returns `false` without changes when the plant is already infected.
    pub fn seed(&mut self, table: &ProgressionTable) -> bool {
        if !self.is_healthy() {
            return false;
        }
        self.infection = table.seed_infection();
        true
    }

    /// Advances infection by one day. Only plants strictly between healthy and
    /// saturated progress; the result is clamped to one.
    pub fn progression(&mut self, table: &ProgressionTable) {
        self.infection = table.advance(self.infection, self.resistance);
    }

    /// Refreshes infectivity: zero inside the latency window, otherwise equal
    /// to the infection level.
    pub fn define_infectivity(&mut self, table: &ProgressionTable) -> f64 {
        self.infectivity = if self.infection < table.latency_threshold() {
            0.0
        } else {
            self.infection
        };
        self.infectivity
    }

    /// Recomputes the production multiplier: `1 - 0.5 * infection`.
    pub fn get_production(&mut self) -> f64 {
        self.production = 1.0 - 0.5 * self.infection;
        self.production
    }
}
