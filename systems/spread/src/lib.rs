#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Three-tier infection spread kernel.
//!
//! The system reads the plant population, scores every cell holding
//! infectious plants and emits [`Command::SeedInfection`] for the plants that
//! become infected today. Tiers run in order: within-cell for every scored
//! cell, adjacent for every scored cell, then a single landscape-wide draw.
//! A plant seeded by an earlier tier is no longer part of a later tier's
//! healthy pool.

use clr_landscape_core::{CellCoord, Command, PlantId, SpreadTuning, WeatherGate};
use clr_landscape_world::PlantPopulation;
use rand::Rng;
use tracing::debug;

/// Summed infectivity of one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellScore {
    /// Scored cell.
    pub cell: CellCoord,
    /// Sum of resident infectivity.
    pub score: f64,
}

/// Pure system that turns a population view and a weather gate into seeding
/// commands.
#[derive(Debug)]
pub struct InfectionSpread {
    tuning: SpreadTuning,
    scores: Vec<CellScore>,
    claimed: Vec<bool>,
    pool: Vec<PlantId>,
}

impl Default for InfectionSpread {
    fn default() -> Self {
        Self::new(SpreadTuning::default())
    }
}

impl InfectionSpread {
    /// Creates the spread system with the provided thresholds.
    #[must_use]
    pub fn new(tuning: SpreadTuning) -> Self {
        Self {
            tuning,
            scores: Vec::new(),
            claimed: Vec::new(),
            pool: Vec::new(),
        }
    }

    /// Thresholds in use.
    #[must_use]
    pub fn tuning(&self) -> &SpreadTuning {
        &self.tuning
    }

    /// Scores the population and emits the day's seeding commands.
    pub fn handle<R: Rng + ?Sized>(
        &mut self,
        gate: WeatherGate,
        population: &PlantPopulation,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) {
        if !gate.within_cell() {
            return;
        }
        let mut scores = std::mem::take(&mut self.scores);
        score_cells(population, &mut scores);
        self.spread(gate, &scores, population, rng, out);
        self.scores = scores;
    }

    /// Applies the three tiers to precomputed cell scores.
    ///
    /// `scores` must be in the order cells should be visited.
    pub fn spread<R: Rng + ?Sized>(
        &mut self,
        gate: WeatherGate,
        scores: &[CellScore],
        population: &PlantPopulation,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) {
        if !gate.within_cell() || scores.is_empty() {
            return;
        }

        self.claimed.clear();
        self.claimed.resize(population.len(), false);
        let before = out.len();

        for entry in scores {
            if entry.score >= self.tuning.within_cell_score {
                self.seed_within(entry.cell, population, out);
            }
        }

        if gate.adjacent() {
            for entry in scores {
                if entry.score >= self.tuning.adjacent_score {
                    self.seed_adjacent(entry.cell, population, rng, out);
                }
            }

            if gate.global() {
                let total: f64 = scores.iter().map(|entry| entry.score).sum();
                self.seed_global(total, population, rng, out);
            }
        }

        debug!(
            scored_cells = scores.len(),
            seeded = out.len() - before,
            "spread evaluated"
        );
    }

    fn seed_within(&mut self, cell: CellCoord, population: &PlantPopulation, out: &mut Vec<Command>) {
        let candidate = population
            .ids_in(cell)
            .find(|plant| self.is_available(population, *plant));
        if let Some(plant) = candidate {
            self.claim(plant, out);
        }
    }

    fn seed_adjacent<R: Rng + ?Sized>(
        &mut self,
        cell: CellCoord,
        population: &PlantPopulation,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) {
        self.pool.clear();
        for plant in population.ids_around(cell) {
            if self.is_available(population, plant) {
                self.pool.push(plant);
            }
        }
        if self.pool.is_empty() {
            return;
        }
        if rng.gen::<f64>() >= self.tuning.adjacent_probability {
            return;
        }
        let plant = self.pool[rng.gen_range(0..self.pool.len())];
        self.claim(plant, out);
    }

    fn seed_global<R: Rng + ?Sized>(
        &mut self,
        total: f64,
        population: &PlantPopulation,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) {
        if total < self.tuning.global_score {
            return;
        }
        self.pool.clear();
        for (plant, _) in population.iter() {
            if self.is_available(population, plant) {
                self.pool.push(plant);
            }
        }
        if self.pool.len() <= self.tuning.global_min_healthy || self.pool.is_empty() {
            return;
        }

        // Draws are taken with replacement from the pool as it stood before the
        // first draw, so fewer distinct plants than draws may be seeded.
        for _ in 0..self.tuning.global_draws {
            let plant = self.pool[rng.gen_range(0..self.pool.len())];
            if !self.claimed[plant.index()] {
                self.claim(plant, out);
            }
        }
    }

    fn is_available(&self, population: &PlantPopulation, plant: PlantId) -> bool {
        let unclaimed = self.claimed.get(plant.index()).is_some_and(|taken| !taken);
        unclaimed && population.get(plant).is_some_and(|plant| plant.is_healthy())
    }

    fn claim(&mut self, plant: PlantId, out: &mut Vec<Command>) {
        if let Some(taken) = self.claimed.get_mut(plant.index()) {
            *taken = true;
        }
        out.push(Command::SeedInfection { plant });
    }
}

/// Collects the summed infectivity of every cell whose residents have nonzero
/// infectivity, in row-major cell order.
pub fn score_cells(population: &PlantPopulation, out: &mut Vec<CellScore>) {
    out.clear();
    let mut current: Option<CellScore> = None;
    for (_, plant) in population.iter() {
        match current.as_mut() {
            Some(entry) if entry.cell == plant.cell() => entry.score += plant.infectivity(),
            _ => {
                if let Some(entry) = current.take() {
                    push_scored(out, entry);
                }
                current = Some(CellScore {
                    cell: plant.cell(),
                    score: plant.infectivity(),
                });
            }
        }
    }
    if let Some(entry) = current {
        push_scored(out, entry);
    }
}

fn push_scored(out: &mut Vec<CellScore>, entry: CellScore) {
    if entry.score > 0.0 {
        out.push(entry);
    }
}
