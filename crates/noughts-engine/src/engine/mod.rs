//! Game flow on top of the [`Board`](crate::Board).
//!
//! - [`GameSession`] - one game: whose turn it is, move validation, outcome
//! - [`MatchStats`] - tallies of outcomes over many games
//!
//! # Example
//!
//! ```
//! use noughts_engine::{Cell, GameOutcome, GameSession, Mark};
//!
//! let mut session = GameSession::new();
//! for index in [4, 0, 2, 6, 3, 5, 1, 7, 8] {
//!     let cell = Cell::from_index(index).unwrap();
//!     if let Some(outcome) = session.play(cell).unwrap() {
//!         assert_eq!(outcome, GameOutcome::Draw);
//!     }
//! }
//! assert!(session.state().is_finished());
//! ```

pub use self::{game_session::*, match_stats::*};

mod game_session;
mod match_stats;
