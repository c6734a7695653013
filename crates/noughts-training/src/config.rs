//! Training configuration.
//!
//! [`EvolutionConfig`] holds every knob of a training run. All fields have
//! defaults, so a JSON file only needs to mention what it changes:
//!
//! ```
//! use noughts_training::config::EvolutionConfig;
//!
//! let config: EvolutionConfig =
//!     serde_json::from_str(r#"{ "generations": 5, "mutation": { "rate": 0.1 } }"#).unwrap();
//! assert_eq!(config.generations, 5);
//! assert_eq!(config.population_size, 50);
//! assert!((config.mutation.rate - 0.1).abs() < 1e-9);
//! assert!(config.validate().is_ok());
//! ```

use noughts_evaluator::{
    fitness::{FirstMover, FitnessEvaluator, IllegalMovePolicy, OpponentSchedule, RewardShaping},
    policy_network::NetworkTopology,
};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, weights::ParameterRange};

/// How two parents are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Crossover {
    /// Gene-wise mean.
    #[default]
    Average,
    /// Gene-wise interpolation with a random weight per gene.
    Blend,
}

/// Mutation schedule and strength.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationParams {
    /// Fraction of the generations (from the start) without mutation.
    pub warmup_fraction: f64,
    /// Per-gene probability of replacement by a fresh uniform value.
    pub rate: f64,
    /// Probability that a child also gets a burst.
    pub burst_probability: f64,
    pub burst_genes_min: usize,
    pub burst_genes_max: usize,
    /// Standard deviation of the burst noise.
    pub burst_sigma: f32,
}

impl Default for MutationParams {
    fn default() -> Self {
        Self {
            warmup_fraction: 0.3,
            rate: 0.2,
            burst_probability: 0.3,
            burst_genes_min: 1,
            burst_genes_max: 3,
            burst_sigma: 0.5,
        }
    }
}

impl MutationParams {
    /// Returns `true` if offspring of `generation` (0-based) are mutated.
    ///
    /// Mutation starts once more than `warmup_fraction` of the generations
    /// have been evaluated, counting `generation` itself.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn is_active(&self, generation: usize, generations: usize) -> bool {
        (generation + 1) as f64 > (self.warmup_fraction * generations as f64).floor()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub generations: usize,
    pub games_per_individual: usize,
    pub elite_count: usize,
    pub tournament_size: usize,
    pub parameter_range: ParameterRange,
    pub topology: NetworkTopology,
    pub crossover: Crossover,
    pub mutation: MutationParams,
    pub schedule: OpponentSchedule,
    pub rewards: RewardShaping,
    pub illegal_moves: IllegalMovePolicy,
    pub first_mover: FirstMover,
    /// Fraction of each evaluation's games played with masked prediction.
    pub masked_fraction: f64,
    /// Seed of the run's random number generator; random if absent.
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 50,
            games_per_individual: 20,
            elite_count: 1,
            tournament_size: 2,
            parameter_range: ParameterRange::default(),
            topology: NetworkTopology::default(),
            crossover: Crossover::default(),
            mutation: MutationParams::default(),
            schedule: OpponentSchedule::default(),
            rewards: RewardShaping::default(),
            illegal_moves: IllegalMovePolicy::default(),
            first_mover: FirstMover::default(),
            masked_fraction: 0.3,
            seed: None,
        }
    }
}

impl EvolutionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let population_size = self.population_size;
        if population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.generations == 0 {
            return Err(ConfigError::NoGenerations);
        }
        if self.games_per_individual == 0 {
            return Err(ConfigError::NoGames);
        }
        if self.tournament_size == 0 || self.tournament_size > population_size {
            return Err(ConfigError::InvalidTournamentSize {
                tournament_size: self.tournament_size,
                population_size,
            });
        }
        if self.elite_count >= population_size {
            return Err(ConfigError::TooManyElites {
                elite_count: self.elite_count,
                population_size,
            });
        }
        if !self.parameter_range.is_valid() {
            return Err(ConfigError::EmptyParameterRange {
                min: self.parameter_range.min,
                max: self.parameter_range.max,
            });
        }
        self.topology.validate().map_err(ConfigError::Topology)?;

        let fractions = [
            ("mutation.warmup_fraction", self.mutation.warmup_fraction),
            ("mutation.rate", self.mutation.rate),
            ("mutation.burst_probability", self.mutation.burst_probability),
            ("schedule.soft_fraction", self.schedule.soft_fraction),
            ("schedule.soft_strength", self.schedule.soft_strength),
            ("schedule.hard_strength", self.schedule.hard_strength),
            ("masked_fraction", self.masked_fraction),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::FractionOutOfRange { name, value });
            }
        }
        let step = self.schedule.soft_strength_step;
        if step.is_nan() || step < 0.0 {
            return Err(ConfigError::FractionOutOfRange {
                name: "schedule.soft_strength_step",
                value: step,
            });
        }

        let MutationParams {
            burst_genes_min: min,
            burst_genes_max: max,
            burst_sigma,
            ..
        } = self.mutation;
        if min == 0 || min > max {
            return Err(ConfigError::InvalidBurstGenes { min, max });
        }
        if !burst_sigma.is_finite() || burst_sigma <= 0.0 {
            return Err(ConfigError::InvalidBurstSigma { value: burst_sigma });
        }
        Ok(())
    }

    /// Builds the fitness function described by this configuration.
    #[must_use]
    pub fn fitness_evaluator(&self) -> FitnessEvaluator {
        FitnessEvaluator {
            topology: self.topology,
            games_per_individual: self.games_per_individual,
            masked_fraction: self.masked_fraction,
            first_mover: self.first_mover,
            schedule: self.schedule,
            rewards: self.rewards,
            illegal_moves: self.illegal_moves,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EvolutionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.topology.parameter_count(), 180);
        assert_eq!(config.crossover, Crossover::Average);
        assert_eq!(config.fitness_evaluator().games_per_individual, 20);
    }

    #[test]
    fn test_rejects_bad_population_settings() {
        let base = EvolutionConfig::default();
        let cases = [
            (
                EvolutionConfig {
                    population_size: 0,
                    ..base.clone()
                },
                ConfigError::EmptyPopulation,
            ),
            (
                EvolutionConfig {
                    tournament_size: 51,
                    ..base.clone()
                },
                ConfigError::InvalidTournamentSize {
                    tournament_size: 51,
                    population_size: 50,
                },
            ),
            (
                EvolutionConfig {
                    elite_count: 50,
                    ..base.clone()
                },
                ConfigError::TooManyElites {
                    elite_count: 50,
                    population_size: 50,
                },
            ),
            (
                EvolutionConfig {
                    generations: 0,
                    ..base.clone()
                },
                ConfigError::NoGenerations,
            ),
        ];
        for (config, expected) in cases {
            assert_eq!(config.validate(), Err(expected));
        }
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let mut config = EvolutionConfig::default();
        config.schedule.hard_strength = 1.2;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FractionOutOfRange {
                name: "schedule.hard_strength",
                ..
            })
        ));

        let mut config = EvolutionConfig::default();
        config.mutation.rate = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = EvolutionConfig::default();
        config.parameter_range = ParameterRange { min: 1.0, max: -1.0 };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyParameterRange { .. })
        ));

        let mut config = EvolutionConfig::default();
        config.mutation.burst_genes_min = 4;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBurstGenes { min: 4, max: 3 })
        ));

        let mut config = EvolutionConfig::default();
        config.topology.hidden = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Topology(_))));
    }

    #[test]
    fn test_mutation_warmup() {
        let mutation = MutationParams::default();
        assert!(!mutation.is_active(0, 50));
        assert!(!mutation.is_active(14, 50));
        assert!(mutation.is_active(15, 50));
        assert!(mutation.is_active(49, 50));

        // 30% of 4 generations rounds down to one warm-up generation
        assert!(!mutation.is_active(0, 4));
        assert!(mutation.is_active(1, 4));

        let none = MutationParams {
            warmup_fraction: 0.0,
            ..MutationParams::default()
        };
        assert!(none.is_active(0, 50));
    }

    #[test]
    fn test_json_round_trip_uses_snake_case() {
        let config = EvolutionConfig {
            crossover: Crossover::Blend,
            seed: Some(7),
            ..EvolutionConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""crossover":"blend""#));
        assert!(json.contains(r#""first_mover":"alternate""#));
        let parsed: EvolutionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
