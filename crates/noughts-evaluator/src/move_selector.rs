//! Common interface for anything that can take a turn.
//!
//! [`MoveSelector`] lets callers pit arbitrary players against each other
//! without knowing what drives them: exact search, a stochastic opponent, a
//! trained network, or a uniformly random player.

use std::fmt;

use noughts_engine::{Board, Cell, Mark};
use rand::{RngCore, seq::IndexedRandom};

use crate::{opponent::StochasticOpponent, policy_network::PolicyNetwork, search::SearchEngine};

/// Chooses a move for `side` on an absolute board.
///
/// Implementations return an empty cell, or `None` if the board has none.
pub trait MoveSelector: fmt::Debug + Send + Sync {
    fn select_move(&self, board: &Board, side: Mark, rng: &mut dyn RngCore) -> Option<Cell>;
}

/// Plays a uniformly random empty cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPlayer;

impl MoveSelector for RandomPlayer {
    fn select_move(&self, board: &Board, _side: Mark, rng: &mut dyn RngCore) -> Option<Cell> {
        board.empty_cells().choose(rng).copied()
    }
}

impl MoveSelector for SearchEngine {
    fn select_move(&self, board: &Board, side: Mark, _rng: &mut dyn RngCore) -> Option<Cell> {
        self.best_move(board, side)
    }
}

impl MoveSelector for StochasticOpponent {
    fn select_move(&self, board: &Board, side: Mark, rng: &mut dyn RngCore) -> Option<Cell> {
        StochasticOpponent::select_move(self, board, side, rng)
    }
}

impl MoveSelector for PolicyNetwork {
    fn select_move(&self, board: &Board, side: Mark, _rng: &mut dyn RngCore) -> Option<Cell> {
        self.predict(&board.relative_to(side))
    }
}
