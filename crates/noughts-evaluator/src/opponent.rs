//! A search engine that sometimes plays at random.
//!
//! [`StochasticOpponent`] is the training adversary: with probability `p`
//! (its *strength*) it plays the engine's move, otherwise a uniformly random
//! legal move. `p = 1.0` is perfect play, `p = 0.0` is a random player.

use noughts_engine::{Board, Cell, Mark};
use rand::{Rng, seq::IndexedRandom};

use crate::{InvalidProbabilityError, search::SearchEngine};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochasticOpponent {
    strength: f64,
    engine: SearchEngine,
}

impl StochasticOpponent {
    /// Creates an opponent backed by a full-depth [`SearchEngine`].
    pub fn new(strength: f64) -> Result<Self, InvalidProbabilityError> {
        Self::with_engine(strength, SearchEngine::new())
    }

    pub fn with_engine(strength: f64, engine: SearchEngine) -> Result<Self, InvalidProbabilityError> {
        if !(0.0..=1.0).contains(&strength) {
            return Err(InvalidProbabilityError { value: strength });
        }
        Ok(Self { strength, engine })
    }

    #[must_use]
    pub fn strength(&self) -> f64 {
        self.strength
    }

    /// Picks a move for `side` on an absolute board.
    ///
    /// The opening move on an empty board is always random. Returns `None`
    /// when no cell is empty.
    pub fn select_move<R>(&self, board: &Board, side: Mark, rng: &mut R) -> Option<Cell>
    where
        R: Rng + ?Sized,
    {
        let empty = board.empty_cells();
        if empty.is_empty() {
            return None;
        }
        if board.is_empty() || !rng.random_bool(self.strength) {
            return empty.choose(rng).copied();
        }

        // the engine always reasons as the `+1` side
        let view = match side {
            Mark::X => *board,
            Mark::O => board.inverted(),
        };
        self.engine
            .best_move(&view, Mark::X)
            .or_else(|| empty.choose(rng).copied())
    }
}
