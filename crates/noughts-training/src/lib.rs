//! Training system that evolves policy network parameters with a genetic
//! algorithm.
//!
//! # How Training Works
//!
//! 1. **Population** - Create individuals with random genomes drawn from the
//!    parameter range
//! 2. **Evaluation** - Each genome becomes a policy network and plays games
//!    against a stochastic opponent (see `noughts_evaluator::fitness`)
//! 3. **Selection** - Elites survive unchanged, parents are picked by
//!    tournament
//! 4. **Reproduction** - Offspring come from crossover, then mutation once the
//!    warm-up is over
//! 5. **Repeat** - Until the configured number of generations, or until the
//!    run is cancelled
//!
//! # Architecture
//!
//! ```text
//! Evolver (state machine, progress, cancellation)
//!     ↓ drives
//! Population / PopulationEvolver (genetic)
//!     ↓ operators from
//! weights (initialization, crossover, mutation)
//!     ↓ scored by
//! FitnessFunction (noughts-evaluator)
//! ```
//!
//! # Reproducibility
//!
//! All randomness flows from one seeded `Pcg64`. Before each parallel
//! evaluation the evolver draws a seed per individual, so results do not
//! depend on thread scheduling. A fixed [`config::EvolutionConfig::seed`] and
//! a deterministic fitness function reproduce a run exactly.
//!
//! # Example
//!
//! ```rust,no_run
//! use noughts_training::{config::EvolutionConfig, evolver};
//!
//! let config = EvolutionConfig {
//!     generations: 10,
//!     seed: Some(42),
//!     ..EvolutionConfig::default()
//! };
//! let fitness = config.fitness_evaluator();
//! let result = evolver::evolve(&config, &fitness, |report| {
//!     println!("#{} best {:.2}", report.generation, report.best_fitness_so_far);
//! })?;
//! println!("best fitness {:?}", result.best.map(|best| best.fitness));
//! # Ok::<(), noughts_training::EvolveError>(())
//! ```

use noughts_evaluator::{FitnessError, NetworkError};

pub mod config;
pub mod evolver;
pub mod genetic;
pub mod statistics;
pub mod weights;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("population size must be at least 1")]
    EmptyPopulation,
    #[display("number of generations must be at least 1")]
    NoGenerations,
    #[display("games per individual must be at least 1")]
    NoGames,
    #[display("tournament size {tournament_size} must be in 1..={population_size}")]
    InvalidTournamentSize {
        tournament_size: usize,
        population_size: usize,
    },
    #[display("elite count {elite_count} must be smaller than population size {population_size}")]
    TooManyElites {
        elite_count: usize,
        population_size: usize,
    },
    #[display("{name} = {value} is outside [0, 1]")]
    FractionOutOfRange { name: &'static str, value: f64 },
    #[display("parameter range [{min}, {max}] is empty")]
    EmptyParameterRange { min: f32, max: f32 },
    #[display("burst gene count {min}..={max} is invalid")]
    InvalidBurstGenes { min: usize, max: usize },
    #[display("burst sigma {value} must be positive")]
    InvalidBurstSigma { value: f32 },
    #[display("invalid topology: {_0}")]
    Topology(NetworkError),
    #[display("fitness function expects genomes of {actual} genes, topology has {expected}")]
    GenomeLength { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum EvolveError {
    #[display("invalid configuration: {_0}")]
    Config(ConfigError),
    #[display("fitness evaluation failed: {_0}")]
    Fitness(FitnessError),
}
