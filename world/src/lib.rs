#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative per-run state for the coffee leaf rust landscape engine.

mod landscape;
mod plant;
mod population;

use clr_landscape_core::{Command, Event, ParameterSet, ProgressionTable};
use tracing::trace;

pub use landscape::Landscape;
pub use plant::Plant;
pub use population::PlantPopulation;

/// Represents the authoritative state of one simulated season.
#[derive(Clone, Debug)]
pub struct World {
    landscape: Landscape,
    population: PlantPopulation,
    progression: ProgressionTable,
    max_production: f64,
    current_day: Option<u32>,
}

impl World {
    /// Creates a world over `landscape`, placing healthy plants in every coffee cell.
    #[must_use]
    pub fn new(landscape: Landscape, parameters: &ParameterSet) -> Self {
        let population = PlantPopulation::build(&landscape, &parameters.plants);
        Self {
            landscape,
            population,
            progression: parameters.progression.clone(),
            max_production: parameters.plants.max_production,
            current_day: None,
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::AdvanceDay { day } => {
            let table = &world.progression;
            let mut progressed = 0;
            for plant in world
                .population
                .iter_mut()
                .filter(|plant| plant.is_infected())
            {
                plant.progression(table);
                let _ = plant.define_infectivity(table);
                progressed += 1;
            }
            world.current_day = Some(day);
            trace!(day, progressed, "infected plants progressed");
            out_events.push(Event::DayAdvanced { day, progressed });
        }
        Command::SeedInfection { plant } => {
            let table = &world.progression;
            if let Some(target) = world.population.get_mut(plant) {
                if target.seed(table) {
                    out_events.push(Event::PlantInfected {
                        plant,
                        cell: target.cell(),
                    });
                }
            }
        }
        Command::Harvest => {
            let max_production = world.max_production;
            let total: f64 = world
                .population
                .iter_mut()
                .map(|plant| max_production * plant.get_production())
                .sum();
            out_events.push(Event::HarvestCompleted { total });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use clr_landscape_core::{
        CellCoord, DailyMetric, PlantId, ProgressionTable, SnapshotCell, SnapshotGrid,
    };

    use super::{Landscape, Plant, PlantPopulation, World};

    /// Land-cover map of the run.
    #[must_use]
    pub fn landscape(world: &World) -> &Landscape {
        &world.landscape
    }

    /// Plant arena of the run.
    #[must_use]
    pub fn population(world: &World) -> &PlantPopulation {
        &world.population
    }

    /// Band table used for progression and latency.
    #[must_use]
    pub fn progression(world: &World) -> &ProgressionTable {
        &world.progression
    }

    /// Most recent day advanced, if any.
    #[must_use]
    pub fn current_day(world: &World) -> Option<u32> {
        world.current_day
    }

    /// Returns the plant with the provided identifier.
    #[must_use]
    pub fn plant(world: &World, plant: PlantId) -> Option<&Plant> {
        world.population.get(plant)
    }

    /// Identifiers of every plant that has never been infected, in arena order.
    #[must_use]
    pub fn healthy_plants(world: &World) -> Vec<PlantId> {
        world
            .population
            .iter()
            .filter(|(_, plant)| plant.is_healthy())
            .map(|(id, _)| id)
            .collect()
    }

    /// Number of infected plants.
    #[must_use]
    pub fn infected_plant_count(world: &World) -> usize {
        world
            .population
            .iter()
            .filter(|(_, plant)| plant.is_infected())
            .count()
    }

    /// Cells holding at least one infected plant, in row-major order.
    #[must_use]
    pub fn infected_cells(world: &World) -> Vec<CellCoord> {
        world
            .landscape
            .coffee_cells()
            .filter(|cell| {
                world
                    .population
                    .plants_in(*cell)
                    .iter()
                    .any(Plant::is_infected)
            })
            .collect()
    }

    /// Aggregates the epidemic state into the metric record for `day`.
    #[must_use]
    pub fn daily_metric(world: &World, day: u32) -> DailyMetric {
        let infectivity_score: f64 = world
            .population
            .iter()
            .map(|(_, plant)| plant.infectivity())
            .sum();
        DailyMetric {
            day,
            infectivity_score,
            infected_cell_count: infected_cells(world).len(),
            infected_plant_count: infected_plant_count(world),
        }
    }

    /// Captures the categorical land-cover and infection map for `day`.
    #[must_use]
    pub fn snapshot(world: &World, day: u32) -> SnapshotGrid {
        let size = world.landscape.size();
        let cells = world
            .landscape
            .cells()
            .iter()
            .enumerate()
            .map(|(index, coffee)| {
                if !coffee {
                    return SnapshotCell::NonCoffee;
                }
                let infected = CellCoord::from_index(index, size).is_some_and(|cell| {
                    world
                        .population
                        .plants_in(cell)
                        .iter()
                        .any(Plant::is_infected)
                });
                if infected {
                    SnapshotCell::CoffeeInfected
                } else {
                    SnapshotCell::CoffeeHealthy
                }
            })
            .collect();
        SnapshotGrid::new(day, size, cells)
    }

    /// Sum of harvested units using each plant's last computed production.
    #[must_use]
    pub fn harvest(world: &World) -> f64 {
        world
            .population
            .iter()
            .map(|(_, plant)| world.max_production * plant.production())
            .sum()
    }
}
