use noughts_engine::core::{Board, Mark};
use noughts_evaluator::{
    fitness::FitnessFunction,
    move_selector::MoveSelector,
    policy_network::PolicyNetwork,
};
use noughts_training::{
    config::EvolutionConfig,
    evolver::{self, Evolver, RunStatus, TrainingHandle},
};
use rand::SeedableRng;
use rand_pcg::Pcg64;

fn small_config(seed: u64) -> EvolutionConfig {
    EvolutionConfig {
        population_size: 8,
        generations: 4,
        games_per_individual: 6,
        seed: Some(seed),
        ..EvolutionConfig::default()
    }
}

#[test]
fn test_training_produces_a_playable_network() {
    let config = small_config(3);
    let fitness = config.fitness_evaluator();
    let mut reports = Vec::new();
    let result = evolver::evolve(&config, &fitness, |report| reports.push(report.clone())).unwrap();

    assert_eq!(result.status, RunStatus::Completed);
    assert_eq!(result.generations_completed, 4);
    assert_eq!(reports.len(), 4);
    for (i, report) in reports.iter().enumerate() {
        assert_eq!(report.generation, i);
        assert!(report.statistics.min <= report.statistics.max);
        assert!(report.gene_diversity >= 0.0);
    }
    assert!(
        reports
            .windows(2)
            .all(|w| w[0].best_fitness_so_far <= w[1].best_fitness_so_far)
    );
    // warm-up covers only generation 0 of 4
    assert!(!reports[0].mutation_active);
    assert!(reports[1..].iter().all(|report| report.mutation_active));

    let best = result.best.unwrap();
    assert_eq!(best.genome.len(), fitness.genome_len());
    assert!(best.genome.iter().all(|g| (-1.0..=1.0).contains(g)));
    assert!(
        (best.fitness - reports.last().unwrap().best_fitness_so_far).abs() < f32::EPSILON
    );

    let network = PolicyNetwork::from_genome(config.topology, &best.genome).unwrap();
    let mut rng = Pcg64::seed_from_u64(0);
    let board: Board = "x../.o./...".parse().unwrap();
    let cell = network.select_move(&board, Mark::X, &mut rng).unwrap();
    assert!(board.is_vacant(cell));
}

#[test]
fn test_same_seed_same_run() {
    let config = small_config(11);
    let fitness = config.fitness_evaluator();
    let a = evolver::evolve(&config, &fitness, |_| {}).unwrap();
    let b = evolver::evolve(&config, &fitness, |_| {}).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_handle_observes_and_cancels_a_run() {
    let config = small_config(5);
    let fitness = config.fitness_evaluator();
    let handle = TrainingHandle::new();
    let mut evolver = Evolver::new(&config, &fitness)
        .unwrap()
        .with_handle(handle.clone());

    assert!(handle.best_so_far().is_none());
    let report = evolver.step().unwrap();
    let best = handle.best_so_far().unwrap();
    assert_eq!(best.generation, 0);
    assert!((best.fitness - report.best_fitness_so_far).abs() < f32::EPSILON);

    handle.cancel();
    assert!(evolver.step().is_none());
    assert!(evolver.state().is_cancelled());
    let result = evolver.into_result().unwrap();
    assert_eq!(result.status, RunStatus::Cancelled);
    assert_eq!(result.generations_completed, 1);
    assert_eq!(result.best, Some(best));
}
