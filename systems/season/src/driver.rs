//! Single-season driver.

use clr_landscape_core::{
    Command, DailyMetric, Event, ParameterSet, PlantId, RunKey, SeasonParameters, WeatherGate,
};
use clr_landscape_system_landscape::LandscapeGenerator;
use clr_landscape_system_spread::InfectionSpread;
use clr_landscape_system_weather::WeatherProcess;
use clr_landscape_world::{apply, query, World};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{RunSink, RunStreams, SeasonError};

/// Number of random index draws attempted before initial infection falls back
/// to choosing among plants known to have neighbours.
const INITIAL_INFECTION_ATTEMPTS: usize = 32;

/// Outcome of one simulated season.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunResult {
    /// Parameter combination and run index.
    pub key: RunKey,
    /// Seed the run's random streams were split from.
    pub seed: u64,
    /// One record per simulated day, in day order.
    pub metrics: Vec<DailyMetric>,
    /// Total harvested units at season end.
    pub harvest: f64,
}

/// Infects one random plant and one random plant from its 8-neighbour cells.
///
/// A first pick whose neighbourhood holds no plants is redrawn. Should every
/// draw miss, the first plant is chosen among the plants that do have
/// neighbours.
pub fn initial_infection<R: Rng + ?Sized>(
    world: &mut World,
    rng: &mut R,
) -> Result<[PlantId; 2], SeasonError> {
    let population = query::population(world);
    if population.is_empty() {
        return Err(SeasonError::NoCoffeeCells);
    }

    let mut pair = None;
    for attempt in 0..INITIAL_INFECTION_ATTEMPTS {
        let first = population_id(rng.gen_range(0..population.len()));
        if let Some(chosen) = first.and_then(|first| pick_neighbor(world, first, rng)) {
            pair = Some(chosen);
            break;
        }
        debug!(attempt, "initial infection drew a plant without neighbours");
    }

    let pair = match pair {
        Some(pair) => pair,
        None => {
            let eligible: Vec<PlantId> = population
                .iter()
                .filter(|(_, plant)| population.count_around(plant.cell()) > 0)
                .map(|(id, _)| id)
                .collect();
            if eligible.is_empty() {
                return Err(SeasonError::NoAdjacentPlants);
            }
            warn!(
                eligible = eligible.len(),
                "initial infection fell back to plants with neighbours"
            );
            let first = eligible[rng.gen_range(0..eligible.len())];
            pick_neighbor(world, first, rng).ok_or(SeasonError::NoAdjacentPlants)?
        }
    };

    let mut events = Vec::new();
    for plant in pair {
        apply(world, Command::SeedInfection { plant }, &mut events);
    }
    debug!(first = pair[0].get(), second = pair[1].get(), "initial infection seeded");
    Ok(pair)
}

fn pick_neighbor<R: Rng + ?Sized>(
    world: &World,
    first: PlantId,
    rng: &mut R,
) -> Option<[PlantId; 2]> {
    let population = query::population(world);
    let cell = population.get(first)?.cell();
    let around = population.count_around(cell);
    if around == 0 {
        return None;
    }
    let second = population.ids_around(cell).nth(rng.gen_range(0..around))?;
    Some([first, second])
}

fn population_id(index: usize) -> Option<PlantId> {
    u32::try_from(index).ok().map(PlantId::new)
}

/// Drives a single season over one world, owning its random streams.
#[derive(Debug)]
pub struct SeasonRunner {
    world: World,
    weather: WeatherProcess,
    spread: InfectionSpread,
    season: SeasonParameters,
    streams: RunStreams,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl SeasonRunner {
    /// Creates a runner over `world` using the season, weather, and spread
    /// settings from `parameters`.
    #[must_use]
    pub fn new(world: World, parameters: &ParameterSet, streams: RunStreams) -> Self {
        Self {
            world,
            weather: WeatherProcess::new(parameters.weather.clone()),
            spread: InfectionSpread::new(parameters.spread.clone()),
            season: parameters.season.clone(),
            streams,
            commands: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Current world state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Seeds the two initial infections from the run's seeding stream.
    pub fn initial_infection(&mut self) -> Result<[PlantId; 2], SeasonError> {
        initial_infection(&mut self.world, &mut self.streams.seeding)
    }

    /// Simulates `day` under freshly sampled weather.
    pub fn run_day(&mut self, day: u32) -> DailyMetric {
        let gate = self
            .weather
            .weather_effects(day, &mut self.streams.weather);
        self.advance_day(day, gate)
    }

    /// Simulates `day` under the provided weather gate: progression of infected
    /// plants first, then the spread kernel.
    pub fn advance_day(&mut self, day: u32, gate: WeatherGate) -> DailyMetric {
        self.events.clear();
        apply(&mut self.world, Command::AdvanceDay { day }, &mut self.events);

        self.commands.clear();
        self.spread.handle(
            gate,
            query::population(&self.world),
            &mut self.streams.spread,
            &mut self.commands,
        );
        for command in self.commands.drain(..) {
            apply(&mut self.world, command, &mut self.events);
        }

        let metric = query::daily_metric(&self.world, day);
        debug!(
            day,
            within_cell = gate.within_cell(),
            adjacent = gate.adjacent(),
            global = gate.global(),
            infected_plants = metric.infected_plant_count,
            "day simulated"
        );
        metric
    }

    /// Recomputes production for every plant and returns the total harvest.
    pub fn harvest(&mut self) -> f64 {
        self.events.clear();
        apply(&mut self.world, Command::Harvest, &mut self.events);
        self.events
            .iter()
            .find_map(|event| match event {
                Event::HarvestCompleted { total } => Some(*total),
                _ => None,
            })
            .unwrap_or_else(|| query::harvest(&self.world))
    }

    /// Runs the whole season: initial infection, every day with snapshots on
    /// the configured days, then harvest.
    pub fn run_season(mut self, key: RunKey, sink: &dyn RunSink) -> Result<RunResult, SeasonError> {
        let _ = self.initial_infection()?;
        info!(
            run = key.run,
            combination = %key.combination(),
            plants = query::population(&self.world).len(),
            "run started"
        );

        let mut metrics = Vec::with_capacity(self.season.days as usize);
        for day in 0..self.season.days {
            metrics.push(self.run_day(day));
            if self.season.snapshot_days.contains(&day) {
                info!(run = key.run, day, "reached day {day}");
                let grid = query::snapshot(&self.world, day);
                if let Err(error) = sink.snapshot(&key, &grid) {
                    warn!(run = key.run, day, %error, "snapshot not persisted");
                }
            }
        }

        let harvest = self.harvest();
        let result = RunResult {
            key,
            seed: self.streams.seed(),
            metrics,
            harvest,
        };
        if let Err(error) = sink.run_completed(&result) {
            warn!(run = result.key.run, %error, "run results not persisted");
        }
        info!(run = result.key.run, harvest, "run finished");
        Ok(result)
    }
}

/// Generates the landscape for `key` and runs one season over it.
///
/// `parameters.landscape` supplies the grid size; proportions and cluster
/// coefficient come from `key`.
pub fn run_season(
    parameters: &ParameterSet,
    key: RunKey,
    sink: &dyn RunSink,
) -> Result<RunResult, SeasonError> {
    let mut streams = RunStreams::for_run(parameters.season.seed, &key);
    let landscape = LandscapeGenerator::new().generate(
        parameters.landscape.size,
        key.cluster,
        &key.proportions,
        &mut streams.landscape,
    )?;
    if landscape.coffee_count() == 0 {
        return Err(SeasonError::NoCoffeeCells);
    }
    let world = World::new(landscape, parameters);
    SeasonRunner::new(world, parameters, streams).run_season(key, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clr_landscape_world::Landscape;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn world(landscape: Landscape) -> World {
        let mut parameters = ParameterSet::default();
        parameters.plants.plants_per_cell = 1;
        World::new(landscape, &parameters)
    }

    #[test]
    fn isolated_cells_fall_back_to_neighboured_plants() {
        // Only the two cells in the top-left corner touch each other.
        let mut cells = vec![false; 25];
        cells[0] = true;
        cells[1] = true;
        cells[14] = true;
        cells[24] = true;
        cells[22] = true;
        let mut world = world(Landscape::from_cells(5, cells).expect("landscape"));

        for seed in 0..16 {
            let mut candidate = world.clone();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let [first, second] =
                initial_infection(&mut candidate, &mut rng).expect("initial infection");
            let population = query::population(&candidate);
            let first_cell = population.get(first).expect("plant").cell();
            let second_cell = population.get(second).expect("plant").cell();
            assert!(first_cell.is_adjacent(second_cell));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let _ = initial_infection(&mut world, &mut rng).expect("initial infection");
        assert_eq!(query::infected_plant_count(&world), 2);
    }

    #[test]
    fn landscape_without_neighbours_is_rejected() {
        let mut cells = vec![false; 9];
        cells[0] = true;
        cells[8] = true;
        let mut world = world(Landscape::from_cells(3, cells).expect("landscape"));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(
            initial_infection(&mut world, &mut rng),
            Err(SeasonError::NoAdjacentPlants)
        ));
        assert_eq!(query::infected_plant_count(&world), 0);
    }

    #[test]
    fn empty_population_is_rejected() {
        let mut world = world(Landscape::from_cells(2, vec![false; 4]).expect("landscape"));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(
            initial_infection(&mut world, &mut rng),
            Err(SeasonError::NoCoffeeCells)
        ));
    }
}
