//! Fitness: how well does a genome play?
//!
//! A genome is turned into a [`PolicyNetwork`], which then plays a series of
//! games against a [`StochasticOpponent`]. Every game produces a score from
//! shaped rewards; the fitness is the mean over all games.
//!
//! # Reward Shaping
//!
//! ```text
//! legal network move         +move_reward
//! illegal network move (k-th) -illegal_penalty * (1 + illegal_escalation * (k - 1))
//! win                        +win_reward + speed_bonus * (9 - network_moves)
//! draw                       +draw_reward
//! loss                       -(loss_penalty + speed_bonus * (9 - network_moves))
//! rage quit                  -rage_quit_penalty (game ends, no terminal reward)
//! ```
//!
//! An illegal move is never fatal. The network's choice is replaced by a
//! random legal cell and the game continues, until the network has made more
//! than `rage_quit_after` illegal moves in the same game.
//!
//! # Schedules
//!
//! Within one evaluation of `N` games:
//!
//! - the first `masked_fraction * N` games mask occupied cells, so the network
//!   cannot move illegally ("training wheels");
//! - the first `soft_fraction * N` games face an opponent of `soft_strength`,
//!   the rest one of `hard_strength`.
//!
//! Who moves first follows [`FirstMover`]. The first mover always plays `X`.

use std::fmt;

use noughts_engine::{Board, Cell, GameOutcome, Mark};
use rand::{Rng, RngCore, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{
    FitnessError,
    opponent::StochasticOpponent,
    policy_network::{NetworkTopology, PolicyNetwork},
};

/// Scores a genome.
///
/// Used by the genetic algorithm to compute the fitness of each individual.
/// Implementations must be deterministic for a given RNG state.
pub trait FitnessFunction: fmt::Debug + Send + Sync {
    /// Length of the genomes this function accepts.
    fn genome_len(&self) -> usize;

    /// Computes the fitness of `genome` (higher is better).
    ///
    /// `generation` is the zero-based generation index, for functions whose
    /// difficulty changes as training progresses.
    fn evaluate(
        &self,
        genome: &[f32],
        generation: usize,
        rng: &mut dyn RngCore,
    ) -> Result<f32, FitnessError>;
}

/// Reward and penalty constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardShaping {
    pub move_reward: f32,
    pub win_reward: f32,
    pub speed_bonus: f32,
    pub draw_reward: f32,
    pub loss_penalty: f32,
    pub illegal_penalty: f32,
    pub illegal_escalation: f32,
}

impl Default for RewardShaping {
    fn default() -> Self {
        Self {
            move_reward: 1.0,
            win_reward: 10.0,
            speed_bonus: 1.0,
            draw_reward: 5.0,
            loss_penalty: 10.0,
            illegal_penalty: 15.0,
            illegal_escalation: 0.5,
        }
    }
}

impl RewardShaping {
    /// Cost of the `offense`-th illegal move in a game (1-based).
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn illegal_cost(&self, offense: usize) -> f32 {
        let repeats = offense.saturating_sub(1) as f32;
        self.illegal_penalty * (1.0 + self.illegal_escalation * repeats)
    }

    /// Reward for the end of a game, from the network's point of view.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn terminal_reward(&self, outcome: GameOutcome, network_mark: Mark, network_moves: usize) -> f32 {
        let spare = Cell::COUNT.saturating_sub(network_moves) as f32;
        match outcome.score_for(network_mark) {
            1 => self.win_reward + self.speed_bonus * spare,
            0 => self.draw_reward,
            _ => -(self.loss_penalty + self.speed_bonus * spare),
        }
    }
}

/// When a game is cut short for repeated illegal moves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IllegalMovePolicy {
    /// Number of illegal moves tolerated in one game.
    pub rage_quit_after: usize,
    pub rage_quit_penalty: f32,
}

impl Default for IllegalMovePolicy {
    fn default() -> Self {
        Self {
            rage_quit_after: 3,
            rage_quit_penalty: 50.0,
        }
    }
}

/// Opponent strength across the games of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpponentSchedule {
    /// Fraction of games (from the start) played against the soft opponent.
    pub soft_fraction: f64,
    pub soft_strength: f64,
    pub hard_strength: f64,
    /// Increase of `soft_strength` per generation, capped at `hard_strength`.
    pub soft_strength_step: f64,
}

impl Default for OpponentSchedule {
    fn default() -> Self {
        Self {
            soft_fraction: 0.8,
            soft_strength: 0.5,
            hard_strength: 1.0,
            soft_strength_step: 0.0,
        }
    }
}

impl OpponentSchedule {
    /// Opponent strength for game `game` of `games` in `generation`.
    ///
    /// Only the per-generation increase is capped at `hard_strength`; a soft
    /// strength configured above it is used as is.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn strength_for(&self, game: usize, games: usize, generation: usize) -> f64 {
        if in_leading_fraction(game, games, self.soft_fraction) {
            let raised = self.soft_strength + self.soft_strength_step * generation as f64;
            raised.min(self.hard_strength.max(self.soft_strength))
        } else {
            self.hard_strength
        }
    }
}

/// Who opens each game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstMover {
    Network,
    Opponent,
    /// Network opens the even-numbered games, the opponent the odd ones.
    #[default]
    Alternate,
}

impl FirstMover {
    #[must_use]
    pub fn network_opens(self, game: usize) -> bool {
        match self {
            Self::Network => true,
            Self::Opponent => false,
            Self::Alternate => game % 2 == 0,
        }
    }
}

/// Summary of one training game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub network_mark: Mark,
    /// `None` if the game was abandoned by a rage quit.
    pub outcome: Option<GameOutcome>,
    pub network_moves: usize,
    pub illegal_attempts: usize,
    pub rage_quit: bool,
    pub opponent_strength: f64,
    pub masked: bool,
    pub fitness: f32,
}

/// Default fitness function: games against a scheduled stochastic opponent.
#[derive(Debug, Clone, PartialEq)]
pub struct FitnessEvaluator {
    pub topology: NetworkTopology,
    pub games_per_individual: usize,
    /// Fraction of games (from the start) played with masked prediction.
    pub masked_fraction: f64,
    pub first_mover: FirstMover,
    pub schedule: OpponentSchedule,
    pub rewards: RewardShaping,
    pub illegal_moves: IllegalMovePolicy,
}

impl Default for FitnessEvaluator {
    fn default() -> Self {
        Self {
            topology: NetworkTopology::default(),
            games_per_individual: 20,
            masked_fraction: 0.3,
            first_mover: FirstMover::default(),
            schedule: OpponentSchedule::default(),
            rewards: RewardShaping::default(),
            illegal_moves: IllegalMovePolicy::default(),
        }
    }
}

impl FitnessEvaluator {
    /// Plays game number `game` of an evaluation and returns its record.
    pub fn play_game<R>(
        &self,
        network: &PolicyNetwork,
        game: usize,
        generation: usize,
        rng: &mut R,
    ) -> Result<GameRecord, FitnessError>
    where
        R: Rng + ?Sized,
    {
        let games = self.games_per_individual;
        let opponent_strength = self.schedule.strength_for(game, games, generation);
        let opponent = StochasticOpponent::new(opponent_strength)?;
        let masked = in_leading_fraction(game, games, self.masked_fraction);
        let network_mark = if self.first_mover.network_opens(game) {
            Mark::X
        } else {
            Mark::O
        };

        let mut record = GameRecord {
            network_mark,
            outcome: None,
            network_moves: 0,
            illegal_attempts: 0,
            rage_quit: false,
            opponent_strength,
            masked,
            fitness: 0.0,
        };

        let mut board = Board::EMPTY;
        let mut to_move = Mark::X;
        while !board.is_over() {
            let cell = if to_move == network_mark {
                let Some(chosen) = network.predict_with(&board.relative_to(network_mark), masked)
                else {
                    break;
                };
                if board.is_vacant(chosen) {
                    record.fitness += self.rewards.move_reward;
                    chosen
                } else {
                    record.illegal_attempts += 1;
                    record.fitness -= self.rewards.illegal_cost(record.illegal_attempts);
                    if record.illegal_attempts > self.illegal_moves.rage_quit_after {
                        record.fitness -= self.illegal_moves.rage_quit_penalty;
                        record.rage_quit = true;
                        tracing::trace!(game, illegal = record.illegal_attempts, "rage quit");
                        return Ok(record);
                    }
                    let Some(substitute) = board.empty_cells().choose(rng).copied() else {
                        break;
                    };
                    substitute
                }
            } else {
                let Some(cell) = opponent.select_move(&board, to_move, rng) else {
                    break;
                };
                cell
            };

            board.set(cell, to_move);
            if to_move == network_mark {
                record.network_moves += 1;
            }
            to_move = to_move.opponent();
        }

        if let Some(outcome) = board.outcome() {
            record.fitness += self
                .rewards
                .terminal_reward(outcome, network_mark, record.network_moves);
            record.outcome = Some(outcome);
        }
        Ok(record)
    }

    /// Plays every game of an evaluation.
    pub fn play_games<R>(
        &self,
        network: &PolicyNetwork,
        generation: usize,
        rng: &mut R,
    ) -> Result<Vec<GameRecord>, FitnessError>
    where
        R: Rng + ?Sized,
    {
        (0..self.games_per_individual)
            .map(|game| self.play_game(network, game, generation, rng))
            .collect()
    }
}

impl FitnessFunction for FitnessEvaluator {
    fn genome_len(&self) -> usize {
        self.topology.parameter_count()
    }

    #[expect(clippy::cast_precision_loss)]
    fn evaluate(
        &self,
        genome: &[f32],
        generation: usize,
        rng: &mut dyn RngCore,
    ) -> Result<f32, FitnessError> {
        let network = PolicyNetwork::from_genome(self.topology, genome)?;
        let records = self.play_games(&network, generation, rng)?;
        if records.is_empty() {
            return Ok(0.0);
        }
        let total = records.iter().map(|record| record.fitness).sum::<f32>();
        Ok(total / records.len() as f32)
    }
}

#[expect(clippy::cast_precision_loss)]
fn in_leading_fraction(index: usize, total: usize, fraction: f64) -> bool {
    (index as f64) < fraction * total as f64
}
