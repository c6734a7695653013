//! The training run as a state machine.
//!
//! ```text
//! Idle → Initializing → Evaluating → Reproducing → Evaluating → … → Completed
//!                            │                                    ↘ Cancelled
//!                            └──────────────────────────────────→ Error
//! ```
//!
//! [`Evolver::step`] advances one generation at a time: it evaluates the
//! current population, updates the best-ever individual, reports progress and
//! then either finishes or breeds the next generation. [`evolve`] simply
//! steps until the run is over.
//!
//! A run can be cancelled from any thread through its [`TrainingHandle`].
//! Cancellation is cooperative: it takes effect at the next generation
//! boundary, and the run still returns the best individual found so far.

use std::sync::{
    Arc, PoisonError, RwLock,
    atomic::{AtomicBool, Ordering},
};

use noughts_evaluator::fitness::FitnessFunction;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::{
    ConfigError, EvolveError,
    config::EvolutionConfig,
    genetic::{IdentitySequence, Individual, IndividualId, Population, PopulationEvolver},
    statistics::FitnessSummary,
};

#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum EvolverState {
    Idle,
    Initializing,
    Evaluating { generation: usize },
    Reproducing { generation: usize },
    Completed,
    Cancelled,
    Error(EvolveError),
}

impl EvolverState {
    /// Returns `true` once the run can make no further progress.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Error(_))
    }
}

/// Copy of the best individual seen so far in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestSnapshot {
    pub id: IndividualId,
    /// Generation in which the fitness was measured.
    pub generation: usize,
    pub fitness: f32,
    pub genome: Vec<f32>,
}

impl BestSnapshot {
    fn of(individual: &Individual, generation: usize) -> Self {
        Self {
            id: individual.id(),
            generation,
            fitness: individual.fitness(),
            genome: individual.genome().to_vec(),
        }
    }
}

/// Shared view of a run for other threads: cancel it or peek at the best.
#[derive(Debug, Clone, Default)]
pub struct TrainingHandle {
    cancelled: Arc<AtomicBool>,
    best: Arc<RwLock<Option<BestSnapshot>>>,
}

impl TrainingHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation at the next generation boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn best_so_far(&self) -> Option<BestSnapshot> {
        self.best
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn publish(&self, best: &BestSnapshot) {
        *self.best.write().unwrap_or_else(PoisonError::into_inner) = Some(best.clone());
    }
}

/// Progress of one evaluated generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub generation: usize,
    pub best_fitness_so_far: f32,
    pub generation_best: f32,
    pub statistics: FitnessSummary,
    pub gene_diversity: f32,
    pub mutation_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[display("completed")]
    Completed,
    #[display("cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionResult {
    pub status: RunStatus,
    /// `None` only if the run was cancelled before any evaluation.
    pub best: Option<BestSnapshot>,
    pub generations_completed: usize,
}

/// Runs the genetic algorithm one generation at a time.
#[derive(Debug)]
pub struct Evolver<'a, F>
where
    F: FitnessFunction + ?Sized,
{
    config: EvolutionConfig,
    fitness_fn: &'a F,
    state: EvolverState,
    handle: TrainingHandle,
    rng: Pcg64,
    ids: IdentitySequence,
    population: Option<Population>,
    best: Option<BestSnapshot>,
    generations_completed: usize,
}

impl<'a, F> Evolver<'a, F>
where
    F: FitnessFunction + ?Sized,
{
    /// Validates the configuration and prepares an idle run.
    pub fn new(config: &EvolutionConfig, fitness_fn: &'a F) -> Result<Self, ConfigError> {
        config.validate()?;
        let expected = config.topology.parameter_count();
        let actual = fitness_fn.genome_len();
        if expected != actual {
            return Err(ConfigError::GenomeLength { expected, actual });
        }
        let rng = match config.seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_rng(&mut rand::rng()),
        };
        Ok(Self {
            config: config.clone(),
            fitness_fn,
            state: EvolverState::Idle,
            handle: TrainingHandle::new(),
            rng,
            ids: IdentitySequence::new(),
            population: None,
            best: None,
            generations_completed: 0,
        })
    }

    /// Uses an existing handle, so the caller can cancel or observe the run.
    #[must_use]
    pub fn with_handle(mut self, handle: TrainingHandle) -> Self {
        self.handle = handle;
        self
    }

    #[must_use]
    pub fn handle(&self) -> &TrainingHandle {
        &self.handle
    }

    #[must_use]
    pub fn state(&self) -> &EvolverState {
        &self.state
    }

    #[must_use]
    pub fn best(&self) -> Option<&BestSnapshot> {
        self.best.as_ref()
    }

    #[must_use]
    pub fn population(&self) -> Option<&Population> {
        self.population.as_ref()
    }

    /// Evaluates one generation and prepares the next.
    ///
    /// Returns the generation's report, or `None` once the run is over (see
    /// [`Evolver::state`] for how it ended).
    pub fn step(&mut self) -> Option<GenerationReport> {
        if self.state.is_terminal() {
            return None;
        }
        if self.handle.is_cancelled() {
            tracing::info!(
                generations = self.generations_completed,
                "training cancelled"
            );
            self.state = EvolverState::Cancelled;
            return None;
        }

        if self.state.is_idle() {
            self.initialize();
        }
        let EvolverState::Evaluating { generation } = self.state else {
            return None;
        };

        match self.evaluate(generation) {
            Ok(report) => {
                self.generations_completed = generation + 1;
                if self.generations_completed >= self.config.generations {
                    tracing::info!(
                        generations = self.generations_completed,
                        best_fitness = report.best_fitness_so_far,
                        "training completed"
                    );
                    self.state = EvolverState::Completed;
                } else {
                    self.state = EvolverState::Reproducing { generation };
                    self.reproduce(generation);
                    self.state = EvolverState::Evaluating {
                        generation: generation + 1,
                    };
                }
                Some(report)
            }
            Err(err) => {
                tracing::warn!(generation, error = %err, "training failed");
                self.state = EvolverState::Error(err);
                None
            }
        }
    }

    /// Steps until the run is over, calling `on_generation` after every
    /// evaluated generation.
    pub fn run<C>(mut self, mut on_generation: C) -> Result<EvolutionResult, EvolveError>
    where
        C: FnMut(&GenerationReport),
    {
        while let Some(report) = self.step() {
            on_generation(&report);
        }
        self.into_result()
    }

    /// Final result of a finished run.
    ///
    /// A run that has not reached a terminal state yet is reported as
    /// cancelled.
    pub fn into_result(self) -> Result<EvolutionResult, EvolveError> {
        let status = match self.state {
            EvolverState::Completed => RunStatus::Completed,
            EvolverState::Error(err) => return Err(err),
            _ => RunStatus::Cancelled,
        };
        Ok(EvolutionResult {
            status,
            best: self.best,
            generations_completed: self.generations_completed,
        })
    }

    fn initialize(&mut self) {
        self.state = EvolverState::Initializing;
        tracing::info!(
            population = self.config.population_size,
            generations = self.config.generations,
            genes = self.config.topology.parameter_count(),
            seed = ?self.config.seed,
            "training started"
        );
        self.population = Some(Population::random(
            &mut self.ids,
            self.config.population_size,
            self.config.topology.parameter_count(),
            self.config.parameter_range,
            &mut self.rng,
        ));
        self.state = EvolverState::Evaluating { generation: 0 };
    }

    fn evaluate(&mut self, generation: usize) -> Result<GenerationReport, EvolveError> {
        let Some(population) = self.population.as_mut() else {
            unreachable!("population is created before the first evaluation");
        };
        population.evaluate_fitness(self.fitness_fn, generation, &mut self.rng)?;

        let (Some(generation_best), Some(statistics)) =
            (population.best(), population.fitness_summary())
        else {
            unreachable!("population is never empty");
        };
        if self
            .best
            .as_ref()
            .is_none_or(|best| generation_best.fitness() > best.fitness)
        {
            let snapshot = BestSnapshot::of(generation_best, generation);
            self.handle.publish(&snapshot);
            self.best = Some(snapshot);
        }

        let report = GenerationReport {
            generation,
            best_fitness_so_far: self.best.as_ref().map_or(f32::MIN, |best| best.fitness),
            generation_best: generation_best.fitness(),
            statistics,
            gene_diversity: population.gene_diversity(),
            mutation_active: self
                .config
                .mutation
                .is_active(generation, self.config.generations),
        };
        tracing::debug!(
            generation,
            best = report.generation_best,
            mean = report.statistics.mean,
            diversity = report.gene_diversity,
            "generation evaluated"
        );
        Ok(report)
    }

    fn reproduce(&mut self, generation: usize) {
        let Some(population) = self.population.take() else {
            return;
        };
        let config = &self.config;
        let evolver = PopulationEvolver {
            elite_count: config.elite_count,
            tournament_size: config.tournament_size,
            crossover: config.crossover,
            mutation: config
                .mutation
                .is_active(generation, config.generations)
                .then_some(config.mutation),
            range: config.parameter_range,
        };
        self.population = Some(evolver.evolve(&population, &mut self.ids, &mut self.rng));
    }
}

/// Runs a complete training session.
///
/// `on_generation` is called after every evaluated generation.
pub fn evolve<F, C>(
    config: &EvolutionConfig,
    fitness_fn: &F,
    on_generation: C,
) -> Result<EvolutionResult, EvolveError>
where
    F: FitnessFunction + ?Sized,
    C: FnMut(&GenerationReport),
{
    Evolver::new(config, fitness_fn)?.run(on_generation)
}
