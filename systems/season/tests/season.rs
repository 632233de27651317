use std::sync::Mutex;

use clr_landscape_core::{ParameterSet, RunKey, SnapshotGrid, SweepParameters, WeatherGate};
use clr_landscape_system_landscape::generate;
use clr_landscape_system_season::{
    run_batch, run_season, run_sweep, BatchOptions, BatchResult, CancellationToken, MemorySink,
    NullSink, RunResult, RunSink, RunStreams, SeasonError, SeasonRunner, SinkError,
};
use clr_landscape_world::{query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn parameters(size: u32, days: u32) -> ParameterSet {
    let mut parameters = ParameterSet::default();
    parameters.landscape.size = size;
    parameters.season.days = days;
    parameters.season.snapshot_days = vec![0, days / 2];
    parameters
}

fn all_coffee_runner(seed: u64) -> SeasonRunner {
    let mut parameters = ParameterSet::default();
    parameters.landscape.size = 4;
    parameters.landscape.proportions = vec![0.0, 1.0];
    parameters.plants.plants_per_cell = 1;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let landscape = generate(4, 0.4, &parameters.landscape.proportions, &mut rng)
        .expect("landscape");
    let world = World::new(landscape, &parameters);
    SeasonRunner::new(world, &parameters, RunStreams::from_seed(seed))
}

#[test]
fn initial_infection_seeds_two_adjacent_plants() {
    for seed in 0..20 {
        let mut runner = all_coffee_runner(seed);
        let [first, second] = runner.initial_infection().expect("initial infection");

        let world = runner.world();
        let population = query::population(world);
        assert_eq!(population.len(), 16);

        let seed_value = query::progression(world).seed_infection();
        let infected: Vec<_> = population
            .iter()
            .filter(|(_, plant)| plant.is_infected())
            .collect();
        assert_eq!(infected.len(), 2);
        assert!(infected
            .iter()
            .all(|(_, plant)| (plant.infection() - seed_value).abs() < f64::EPSILON));

        let first_cell = population.get(first).expect("plant").cell();
        let second_cell = population.get(second).expect("plant").cell();
        assert_ne!(first_cell, second_cell);
        assert!(first_cell.is_adjacent(second_cell));
    }
}

#[test]
fn calm_days_only_progress_existing_infections() {
    let mut runner = all_coffee_runner(3);
    let _ = runner.initial_infection().expect("initial infection");

    for day in 0..90 {
        let before: Vec<f64> = query::population(runner.world())
            .iter()
            .map(|(_, plant)| plant.infection())
            .collect();
        let metric = runner.advance_day(day, WeatherGate::CALM);
        assert_eq!(metric.infected_plant_count, 2);
        assert!(metric.infected_cell_count <= 2);

        for ((_, plant), previous) in query::population(runner.world()).iter().zip(before) {
            if previous <= 0.0 {
                assert!(plant.is_healthy());
            } else {
                assert!(plant.infection() >= previous);
            }
        }
    }
}

#[test]
fn plant_state_invariants_hold_through_a_season() {
    let mut parameters = parameters(10, 200);
    parameters.weather.dry.within_cell = 0.9;
    parameters.weather.dry.adjacent = 0.9;
    let mut rng = ChaCha8Rng::seed_from_u64(17);
    let landscape =
        generate(10, 0.4, &parameters.landscape.proportions, &mut rng).expect("landscape");
    let world = World::new(landscape, &parameters);
    let mut runner = SeasonRunner::new(world, &parameters, RunStreams::from_seed(17));
    let _ = runner.initial_infection().expect("initial infection");

    let table = query::progression(runner.world()).clone();
    let mut previous: Vec<f64> = query::population(runner.world())
        .iter()
        .map(|(_, plant)| plant.infection())
        .collect();
    for day in 0..parameters.season.days {
        let _ = runner.run_day(day);
        for ((_, plant), before) in query::population(runner.world()).iter().zip(&previous) {
            assert!((0.0..=1.0).contains(&plant.infection()));
            assert!(plant.infection() >= *before);
            if plant.infection() < table.latency_threshold() {
                assert!(plant.infectivity().abs() < f64::EPSILON);
            } else {
                assert!((plant.infectivity() - plant.infection()).abs() < f64::EPSILON);
            }
        }
        previous = query::population(runner.world())
            .iter()
            .map(|(_, plant)| plant.infection())
            .collect();
    }
    assert!(query::infected_plant_count(runner.world()) > 2);

    let harvest = runner.harvest();
    let max_production = parameters.plants.max_production;
    let mut expected = 0.0;
    for (_, plant) in query::population(runner.world()).iter() {
        assert!((plant.production() - (1.0 - 0.5 * plant.infection())).abs() < f64::EPSILON);
        expected += max_production * plant.production();
    }
    assert!((harvest - expected).abs() < 1e-6);
}

#[test]
fn same_seed_reproduces_season() {
    let parameters = parameters(12, 150);
    let key = RunKey::new(vec![0.4, 0.6], 0.4, 2);
    let first = run_season(&parameters, key.clone(), &NullSink).expect("season");
    let second = run_season(&parameters, key, &NullSink).expect("season");
    assert_eq!(first, second);
    assert_eq!(first.metrics.len(), 150);
    assert!(first
        .metrics
        .iter()
        .enumerate()
        .all(|(day, metric)| metric.day as usize == day));
}

#[test]
fn snapshots_are_persisted_on_configured_days() {
    let parameters = parameters(8, 40);
    let sink = MemorySink::new();
    let key = RunKey::new(vec![0.4, 0.6], 0.3, 0);
    let _ = run_season(&parameters, key.clone(), &sink).expect("season");

    let snapshots = sink.snapshots();
    let days: Vec<u32> = snapshots.iter().map(|(_, grid)| grid.day()).collect();
    assert_eq!(days, vec![0, 20]);
    assert!(snapshots
        .iter()
        .all(|(snapshot_key, grid)| *snapshot_key == key && grid.size() == 8));
}

#[test]
fn empty_batch_returns_no_runs() {
    let batch = run_batch(&ParameterSet::default(), 0, &BatchOptions::default(), &NullSink)
        .expect("batch");
    assert!(batch.runs.is_empty());
    assert_eq!(batch.mean_harvest(), None);
}

#[test]
fn parallel_batch_matches_sequential_batch() {
    let parameters = parameters(10, 60);
    let sequential =
        run_batch(&parameters, 4, &BatchOptions::default(), &NullSink).expect("batch");
    let parallel = run_batch(
        &parameters,
        4,
        &BatchOptions {
            threads: 3,
            ..BatchOptions::default()
        },
        &NullSink,
    )
    .expect("batch");

    assert_eq!(sequential, parallel);
    let runs: Vec<u32> = parallel.returns().iter().map(|(_, run)| *run).collect();
    assert_eq!(runs, vec![0, 1, 2, 3]);
}

#[test]
fn cancelled_batch_starts_no_runs() {
    let token = CancellationToken::new();
    token.cancel();
    let options = BatchOptions {
        threads: 1,
        cancellation: token,
    };
    let outcome = run_batch(&parameters(10, 30), 3, &options, &NullSink);
    match outcome {
        Err(SeasonError::Cancelled { partial }) => assert!(partial.runs.is_empty()),
        other => panic!("expected cancellation, got {other:?}"),
    }
}

struct CancelAfterFirstRun {
    token: CancellationToken,
    returns_written: Mutex<Vec<usize>>,
}

impl RunSink for CancelAfterFirstRun {
    fn snapshot(&self, _key: &RunKey, _grid: &SnapshotGrid) -> Result<(), SinkError> {
        Ok(())
    }

    fn run_completed(&self, _result: &RunResult) -> Result<(), SinkError> {
        self.token.cancel();
        Ok(())
    }

    fn batch_completed(&self, batch: &BatchResult) -> Result<(), SinkError> {
        self.returns_written
            .lock()
            .expect("returns lock")
            .push(batch.runs.len());
        Ok(())
    }
}

#[test]
fn cancelled_batch_keeps_finished_runs() {
    let token = CancellationToken::new();
    let sink = CancelAfterFirstRun {
        token: token.clone(),
        returns_written: Mutex::new(Vec::new()),
    };
    let options = BatchOptions {
        threads: 1,
        cancellation: token,
    };
    let parameters = parameters(10, 30);

    let partial = match run_batch(&parameters, 3, &options, &sink) {
        Err(SeasonError::Cancelled { partial }) => partial,
        other => panic!("expected cancellation, got {other:?}"),
    };
    assert_eq!(partial.returns().len(), 1);
    assert_eq!(partial.runs[0].key.run, 0);

    let full = run_batch(&parameters, 3, &BatchOptions::default(), &NullSink).expect("batch");
    assert_eq!(partial.runs[0], full.runs[0]);
    assert_eq!(*sink.returns_written.lock().expect("returns lock"), vec![1]);
}

#[test]
fn invalid_parameters_fail_before_running() {
    let mut parameters = parameters(10, 30);
    parameters.landscape.proportions = vec![0.7, 0.7];
    assert!(matches!(
        run_batch(&parameters, 2, &BatchOptions::default(), &NullSink),
        Err(SeasonError::Config(_))
    ));
}

#[test]
fn sweep_runs_every_combination() {
    let mut parameters = parameters(10, 30);
    parameters.season.runs = 2;
    let sweep = SweepParameters {
        proportions: vec![vec![0.25, 0.75], vec![0.4, 0.6]],
        clusters: vec![0.3],
    };
    let result =
        run_sweep(&parameters, &sweep, &BatchOptions::default(), &NullSink).expect("sweep");

    assert_eq!(result.batches.len(), 2);
    let batch = result.get(&[0.4, 0.6], 0.3).expect("batch");
    assert_eq!(batch.runs.len(), 2);
    assert_eq!(batch.combination().to_string(), "[0.4, 0.6]-0.3");
    assert!(batch.mean_harvest().expect("mean harvest") > 0.0);
    assert!(batch.runs.iter().all(|run| run.metrics.len() == 30));
}
