//! Genetic algorithm over policy network genomes.
//!
//! # Algorithm Overview
//!
//! 1. **Evaluate Fitness** - Each individual's genome is scored by a
//!    [`FitnessFunction`], in parallel
//! 2. **Elite Selection** - The top `elite_count` individuals are carried over
//!    unchanged, identity included
//! 3. **Tournament Selection** - Two distinct parents are picked, each the
//!    fittest of `tournament_size` random individuals
//! 4. **Crossover** - Parents are combined gene-wise ([`Crossover`])
//! 5. **Mutation** - After the warm-up: fresh-value replacement per gene, plus
//!    an occasional Gaussian burst on a few genes
//!
//! # Key Components
//!
//! - [`IdentitySequence`] - Per-run source of [`IndividualId`]s
//! - [`Individual`] - A genome, its identity and its latest fitness
//! - [`Population`] - The individuals of one generation
//! - [`PopulationEvolver`] - Produces the next generation
//!
//! # Parallelization
//!
//! Individuals are evaluated on scoped threads, one per individual. Each
//! thread gets its own RNG seeded from the caller's RNG before any thread is
//! spawned, so the result is independent of scheduling.

use std::{fmt, thread};

use noughts_evaluator::{FitnessError, fitness::FitnessFunction};
use rand::{Rng, SeedableRng, seq::index};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::{
    config::{Crossover, MutationParams},
    statistics::{self, FitnessSummary},
    weights::{self, ParameterRange},
};

/// Identity of an individual, unique within one training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IndividualId(u64);

impl IndividualId {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for IndividualId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Allocates [`IndividualId`]s in increasing order, starting at 0.
#[derive(Debug, Default)]
pub struct IdentitySequence {
    next: u64,
}

impl IdentitySequence {
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    pub fn next_id(&mut self) -> IndividualId {
        let id = IndividualId(self.next);
        self.next += 1;
        id
    }
}

/// A single candidate solution.
///
/// Fitness starts at `0.0` and is overwritten once per generation by
/// [`Population::evaluate_fitness`].
#[derive(Debug)]
pub struct Individual {
    id: IndividualId,
    genome: Vec<f32>,
    fitness: f32,
}

impl Individual {
    #[must_use]
    pub fn new(ids: &mut IdentitySequence, genome: Vec<f32>) -> Self {
        Self {
            id: ids.next_id(),
            genome,
            fitness: 0.0,
        }
    }

    /// Creates an individual with genes uniform in `range`.
    pub fn random<R>(ids: &mut IdentitySequence, rng: &mut R, range: ParameterRange, len: usize) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::new(ids, weights::random(rng, range, len))
    }

    #[must_use]
    pub fn id(&self) -> IndividualId {
        self.id
    }

    #[must_use]
    pub fn genome(&self) -> &[f32] {
        &self.genome
    }

    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    /// Copies the individual, keeping its identity.
    ///
    /// This is how elites move into the next generation; offspring are created
    /// with [`Individual::new`] and get a fresh identity.
    #[must_use]
    pub fn clone_with_lineage(&self) -> Self {
        Self {
            id: self.id,
            genome: self.genome.clone(),
            fitness: self.fitness,
        }
    }
}

/// The individuals of one generation.
#[derive(Debug)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Creates `count` individuals with random genomes of length `len`.
    pub fn random<R>(
        ids: &mut IdentitySequence,
        count: usize,
        len: usize,
        range: ParameterRange,
        rng: &mut R,
    ) -> Self
    where
        R: Rng + ?Sized,
    {
        let individuals = (0..count)
            .map(|_| Individual::random(ids, rng, range, len))
            .collect();
        Self { individuals }
    }

    #[must_use]
    pub(crate) fn from_individuals(individuals: Vec<Individual>) -> Self {
        Self { individuals }
    }

    /// Individuals, best first once [`Population::evaluate_fitness`] has run.
    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.first()
    }

    /// Scores every individual in parallel and sorts by fitness, best first.
    ///
    /// Individuals with equal fitness keep their relative order.
    pub fn evaluate_fitness<F, R>(
        &mut self,
        fitness_fn: &F,
        generation: usize,
        rng: &mut R,
    ) -> Result<(), FitnessError>
    where
        F: FitnessFunction + ?Sized,
        R: Rng + ?Sized,
    {
        let seeds = (0..self.individuals.len())
            .map(|_| rng.random::<u64>())
            .collect::<Vec<_>>();

        thread::scope(|s| {
            let handles = self
                .individuals
                .iter_mut()
                .zip(seeds)
                .map(|(ind, seed)| {
                    s.spawn(move || -> Result<(), FitnessError> {
                        let mut rng = Pcg64::seed_from_u64(seed);
                        ind.fitness = fitness_fn.evaluate(&ind.genome, generation, &mut rng)?;
                        Ok(())
                    })
                })
                .collect::<Vec<_>>();
            handles.into_iter().try_for_each(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
            })
        })?;

        // sort by fitness descending
        self.individuals
            .sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
        Ok(())
    }

    #[must_use]
    pub fn fitness_summary(&self) -> Option<FitnessSummary> {
        FitnessSummary::new(self.individuals.iter().map(Individual::fitness))
    }

    #[must_use]
    pub fn gene_diversity(&self) -> f32 {
        statistics::gene_diversity(self.individuals.iter().map(Individual::genome))
    }
}

/// Controls how one generation becomes the next.
#[derive(Debug, Clone)]
pub struct PopulationEvolver {
    /// Number of top individuals preserved unchanged (elitism)
    pub elite_count: usize,
    /// Tournament size for selection (larger = stronger selection pressure)
    pub tournament_size: usize,
    pub crossover: Crossover,
    /// Mutation applied to offspring, or `None` during the warm-up
    pub mutation: Option<MutationParams>,
    pub range: ParameterRange,
}

impl PopulationEvolver {
    /// Creates the next generation.
    ///
    /// # Panics
    ///
    /// Panics if `population` is not sorted by fitness, best first.
    pub fn evolve<R>(&self, population: &Population, ids: &mut IdentitySequence, rng: &mut R) -> Population
    where
        R: Rng + ?Sized,
    {
        let individuals = &population.individuals;
        assert!(individuals.is_sorted_by(|a, b| a.fitness >= b.fitness));

        let mut next_individuals = Vec::with_capacity(individuals.len());

        // elite selection
        next_individuals.extend(
            individuals
                .iter()
                .take(self.elite_count)
                .map(Individual::clone_with_lineage),
        );

        // generate the rest individuals
        while next_individuals.len() < individuals.len() {
            let (p1, p2) = select_parents(individuals, self.tournament_size, rng);
            let mut child = match self.crossover {
                Crossover::Average => weights::average(&p1.genome, &p2.genome),
                Crossover::Blend => weights::blend(&p1.genome, &p2.genome, rng),
            };
            if let Some(mutation) = &self.mutation {
                mutate_child(&mut child, mutation, self.range, rng);
            }
            weights::clamp(&mut child, self.range);
            next_individuals.push(Individual::new(ids, child));
        }

        Population::from_individuals(next_individuals)
    }
}

fn mutate_child<R>(child: &mut [f32], mutation: &MutationParams, range: ParameterRange, rng: &mut R)
where
    R: Rng + ?Sized,
{
    weights::mutate(child, mutation.rate, range, rng);
    if rng.random_bool(mutation.burst_probability) {
        let count = rng.random_range(mutation.burst_genes_min..=mutation.burst_genes_max);
        weights::burst(child, count, mutation.burst_sigma, range, rng);
    }
}

/// Picks two parents by tournament; they are distinct whenever the
/// population has at least two individuals.
fn select_parents<'a, R>(
    population: &'a [Individual],
    tournament_size: usize,
    rng: &mut R,
) -> (&'a Individual, &'a Individual)
where
    R: Rng + ?Sized,
{
    let first = tournament_select(population, tournament_size, None, rng);
    let second = if population.len() > 1 {
        tournament_select(population, tournament_size, Some(first), rng)
    } else {
        first
    };
    (&population[first], &population[second])
}

/// Returns the index of the fittest of `tournament_size` random individuals.
///
/// The individual at `exclude` never takes part. Ties go to the lower index,
/// which is the better-ranked one in a sorted population.
fn tournament_select<R>(
    population: &[Individual],
    tournament_size: usize,
    exclude: Option<usize>,
    rng: &mut R,
) -> usize
where
    R: Rng + ?Sized,
{
    assert!(tournament_size > 0);
    let pool = population.len() - usize::from(exclude.is_some());
    let size = tournament_size.min(pool);
    let mut contenders = index::sample(rng, pool, size)
        .into_iter()
        .map(|i| match exclude {
            Some(excluded) if i >= excluded => i + 1,
            _ => i,
        })
        .collect::<Vec<_>>();
    contenders.sort_unstable();
    contenders
        .into_iter()
        .reduce(|best, i| {
            if population[i].fitness > population[best].fitness {
                i
            } else {
                best
            }
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use rand::RngCore;

    use super::*;

    /// Fitness is the sum of the genes.
    #[derive(Debug)]
    struct SumFitness;

    impl FitnessFunction for SumFitness {
        fn genome_len(&self) -> usize {
            4
        }

        fn evaluate(&self, genome: &[f32], _: usize, _: &mut dyn RngCore) -> Result<f32, FitnessError> {
            Ok(genome.iter().sum())
        }
    }

    fn individual_with(ids: &mut IdentitySequence, genome: Vec<f32>, fitness: f32) -> Individual {
        let mut ind = Individual::new(ids, genome);
        ind.fitness = fitness;
        ind
    }

    #[test]
    fn test_identity_sequence_is_per_run() {
        let mut a = IdentitySequence::new();
        let mut b = IdentitySequence::new();
        assert_eq!(a.next_id().value(), 0);
        assert_eq!(a.next_id().value(), 1);
        assert_eq!(b.next_id().value(), 0);
    }

    #[test]
    fn test_evaluate_sorts_best_first() {
        let mut ids = IdentitySequence::new();
        let mut rng = Pcg64::seed_from_u64(0);
        let mut population = Population::random(&mut ids, 10, 4, ParameterRange::default(), &mut rng);
        population.evaluate_fitness(&SumFitness, 0, &mut rng).unwrap();
        let individuals = population.individuals();
        assert!(individuals.is_sorted_by(|a, b| a.fitness() >= b.fitness()));
        for ind in individuals {
            assert!((ind.fitness() - ind.genome().iter().sum::<f32>()).abs() < 1e-6);
        }
        assert_eq!(population.best().map(Individual::fitness), Some(individuals[0].fitness()));
    }

    #[test]
    fn test_elites_keep_identity_and_offspring_get_new_ones() {
        let mut ids = IdentitySequence::new();
        let mut rng = Pcg64::seed_from_u64(1);
        let mut population = Population::random(&mut ids, 8, 4, ParameterRange::default(), &mut rng);
        population.evaluate_fitness(&SumFitness, 0, &mut rng).unwrap();

        let evolver = PopulationEvolver {
            elite_count: 2,
            tournament_size: 2,
            crossover: Crossover::Average,
            mutation: Some(MutationParams::default()),
            range: ParameterRange::default(),
        };
        let next = evolver.evolve(&population, &mut ids, &mut rng);
        assert_eq!(next.individuals().len(), 8);
        for (elite, kept) in population.individuals().iter().zip(next.individuals()).take(2) {
            assert_eq!(kept.id(), elite.id());
            assert_eq!(kept.genome(), elite.genome());
        }
        for child in &next.individuals()[2..] {
            assert!(child.id().value() >= 8);
            assert!(child.genome().iter().all(|g| (-1.0..=1.0).contains(g)));
        }
    }

    #[test]
    fn test_tournament_of_whole_population_picks_the_best() {
        let mut ids = IdentitySequence::new();
        let mut rng = Pcg64::seed_from_u64(2);
        let population = [
            individual_with(&mut ids, vec![0.0], 3.0),
            individual_with(&mut ids, vec![0.0], 2.0),
            individual_with(&mut ids, vec![0.0], 1.0),
        ];
        for _ in 0..20 {
            assert_eq!(tournament_select(&population, 3, None, &mut rng), 0);
            assert_eq!(tournament_select(&population, 3, Some(0), &mut rng), 1);
            let (p1, p2) = select_parents(&population, 3, &mut rng);
            assert_eq!((p1.id().value(), p2.id().value()), (0, 1));
        }
    }

    #[test]
    fn test_parents_are_distinct() {
        let mut ids = IdentitySequence::new();
        let mut rng = Pcg64::seed_from_u64(3);
        let population = (0..5)
            .map(|i| individual_with(&mut ids, vec![0.0], i as f32))
            .collect::<Vec<_>>();
        for _ in 0..100 {
            let (p1, p2) = select_parents(&population, 2, &mut rng);
            assert_ne!(p1.id(), p2.id());
        }
        let single = [individual_with(&mut ids, vec![0.0], 0.0)];
        let (p1, p2) = select_parents(&single, 1, &mut rng);
        assert_eq!(p1.id(), p2.id());
    }

    #[test]
    fn test_identical_parents_reproduce_parent_without_mutation() {
        let mut ids = IdentitySequence::new();
        let mut rng = Pcg64::seed_from_u64(4);
        let genome = vec![0.25, -0.5, 0.75, 0.0];
        let population = Population::from_individuals(
            (0..4)
                .map(|_| individual_with(&mut ids, genome.clone(), 1.0))
                .collect(),
        );
        for crossover in [Crossover::Average, Crossover::Blend] {
            let evolver = PopulationEvolver {
                elite_count: 0,
                tournament_size: 2,
                crossover,
                mutation: None,
                range: ParameterRange::default(),
            };
            let next = evolver.evolve(&population, &mut ids, &mut rng);
            for child in next.individuals() {
                for (c, g) in child.genome().iter().zip(&genome) {
                    assert!((c - g).abs() < 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_gene_diversity_of_clones_is_zero() {
        let mut ids = IdentitySequence::new();
        let population = Population::from_individuals(
            (0..3)
                .map(|_| individual_with(&mut ids, vec![0.1, 0.2], 0.0))
                .collect(),
        );
        assert!(population.gene_diversity().abs() < 1e-6);
        let summary = population.fitness_summary().unwrap();
        assert!(summary.std_dev.abs() < 1e-6);
    }
}
