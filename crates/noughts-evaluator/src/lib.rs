//! Move selection for tic-tac-toe: exact search, a trainable policy network,
//! and the fitness function that scores network parameters.
//!
//! The crate is organized in three layers:
//!
//! 1. **Search** ([`search`]) - Minimax with alpha-beta pruning and move
//!    ordering. Plays perfectly and is the reference every other player is
//!    measured against.
//!
//! 2. **Players** ([`opponent`], [`policy_network`], [`move_selector`]) - A
//!    randomized wrapper around the search with tunable strength, a small
//!    feed-forward network that maps a board to a cell, and the
//!    [`MoveSelector`](move_selector::MoveSelector) seam that lets any of them
//!    sit on either side of a game.
//!
//! 3. **Fitness** ([`fitness`]) - Plays a network against the stochastic
//!    opponent and turns the games into a scalar score for the genetic
//!    algorithm in `noughts-training`.
//!
//! # Architecture
//!
//! ```text
//! FitnessEvaluator (score a genome)
//!     ↓ builds
//! PolicyNetwork (genome → move)     StochasticOpponent (strength p)
//!                                       ↓ delegates with probability p
//!                                   SearchEngine (perfect play)
//! ```
//!
//! # Sign Convention
//!
//! Every component here reasons from "its own" point of view: the side
//! choosing a move is `+1`. Callers holding an absolute
//! [`Board`](noughts_engine::Board) convert with
//! [`Board::relative_to`](noughts_engine::Board::relative_to) (for network
//! inputs) or pass the side explicitly (for the search and the opponent).

pub mod fitness;
pub mod move_selector;
pub mod opponent;
pub mod policy_network;
pub mod search;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum NetworkError {
    #[display("genome has {actual} parameters but the topology needs {expected}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[display(
        "unsupported topology {inputs}-{hidden}-{outputs} (need 9 inputs, 9 outputs and at least one hidden unit)"
    )]
    UnsupportedTopology {
        inputs: usize,
        hidden: usize,
        outputs: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
#[display("opponent strength {value} is not a probability in [0, 1]")]
pub struct InvalidProbabilityError {
    value: f64,
}

impl InvalidProbabilityError {
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Failure while scoring a genome.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum FitnessError {
    #[display("cannot build network: {_0}")]
    Network(NetworkError),
    #[display("cannot build opponent: {_0}")]
    Opponent(InvalidProbabilityError),
}
