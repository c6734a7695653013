//! Genome operations for the genetic algorithm.
//!
//! A genome is a flat `Vec<f32>` of network parameters (see
//! `noughts_evaluator::policy_network` for the layout). These functions
//! implement the initialization, crossover and mutation steps used by
//! [`genetic::PopulationEvolver`](crate::genetic::PopulationEvolver).
//!
//! # Operations
//!
//! - **Initialization**: [`random`] draws every gene uniformly from the
//!   parameter range
//! - **Crossover**: [`average`] (gene-wise mean) and [`blend`] (gene-wise
//!   random interpolation)
//! - **Mutation**: [`mutate`] replaces genes with fresh uniform values, and
//!   [`burst`] nudges a few genes with Gaussian noise
//!
//! Every operator keeps genes inside the [`ParameterRange`].

use rand::{Rng, seq::index};
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

/// Closed interval every gene is kept in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterRange {
    pub min: f32,
    pub max: f32,
}

impl Default for ParameterRange {
    fn default() -> Self {
        Self {
            min: -1.0,
            max: 1.0,
        }
    }
}

impl ParameterRange {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min < self.max
    }

    #[must_use]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    pub fn sample<R>(&self, rng: &mut R) -> f32
    where
        R: Rng + ?Sized,
    {
        rng.random_range(self.min..=self.max)
    }
}

/// Creates a genome by applying a function to each index.
///
/// # Examples
///
/// ```
/// use noughts_training::weights;
///
/// let genome = weights::from_fn(|i| i as f32 * 0.5, 4);
/// assert_eq!(genome, vec![0.0, 0.5, 1.0, 1.5]);
/// ```
pub fn from_fn<F>(mut f: F, len: usize) -> Vec<f32>
where
    F: FnMut(usize) -> f32,
{
    let mut values = Vec::with_capacity(len);
    for i in 0..len {
        values.push(f(i));
    }
    values
}

/// Generates a genome with every gene uniform in `range`.
pub fn random<R>(rng: &mut R, range: ParameterRange, len: usize) -> Vec<f32>
where
    R: Rng + ?Sized,
{
    from_fn(|_| range.sample(rng), len)
}

/// Gene-wise arithmetic mean of two parents.
///
/// # Panics
///
/// Panics if parent genomes have different lengths.
#[must_use]
pub fn average(p1: &[f32], p2: &[f32]) -> Vec<f32> {
    assert_eq!(p1.len(), p2.len());
    from_fn(|i| (p1[i] + p2[i]) / 2.0, p1.len())
}

/// Gene-wise interpolation with an independent random weight per gene.
///
/// Each child gene is `t * p1[i] + (1 - t) * p2[i]` with `t` uniform in
/// `[0, 1]`, so it always lies between the parents.
///
/// # Panics
///
/// Panics if parent genomes have different lengths.
pub fn blend<R>(p1: &[f32], p2: &[f32], rng: &mut R) -> Vec<f32>
where
    R: Rng + ?Sized,
{
    assert_eq!(p1.len(), p2.len());
    from_fn(
        |i| {
            let t: f32 = rng.random_range(0.0..=1.0);
            t * p1[i] + (1.0 - t) * p2[i]
        },
        p1.len(),
    )
}

/// Replaces each gene, with probability `rate`, by a fresh value drawn
/// uniformly from `range`.
pub fn mutate<R>(genome: &mut [f32], rate: f64, range: ParameterRange, rng: &mut R)
where
    R: Rng + ?Sized,
{
    for gene in genome {
        if rng.random_bool(rate) {
            *gene = range.sample(rng);
        }
    }
}

/// Adds `N(0, sigma)` noise to `count` distinct genes, clamping to `range`.
///
/// `count` is capped at the genome length. A non-positive or non-finite
/// `sigma` leaves the genome unchanged.
pub fn burst<R>(genome: &mut [f32], count: usize, sigma: f32, range: ParameterRange, rng: &mut R)
where
    R: Rng + ?Sized,
{
    if !sigma.is_finite() || sigma <= 0.0 {
        return;
    }
    let Ok(normal) = Normal::new(0.0, sigma) else {
        return;
    };
    let count = count.min(genome.len());
    for i in index::sample(rng, genome.len(), count) {
        genome[i] = range.clamp(genome[i] + rng.sample(normal));
    }
}

/// Clamps every gene into `range`.
pub fn clamp(genome: &mut [f32], range: ParameterRange) {
    for gene in genome {
        *gene = range.clamp(*gene);
    }
}
