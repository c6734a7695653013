//! Tic-tac-toe board representation and game rules.
//!
//! This crate is the leaf of the workspace. It knows nothing about search or
//! learning; it only answers "what is on the board", "whose move is it" and
//! "is the game over".
//!
//! - [`core`] - [`Mark`], [`Cell`] and [`Board`] (the 3×3 grid and line logic)
//! - [`engine`] - [`GameSession`] (turn tracking and move validation) and
//!   [`MatchStats`] (win/draw tallies across many games)
//!
//! # Sign Convention
//!
//! A board stores absolute marks: `X` is `+1`, `O` is `-1`, empty is `0`.
//! Components that reason from one side's point of view (the search engine,
//! the policy network) always work on a *relative* encoding where the side
//! reasoning is `+1`. [`Board::relative_to`] is the single adapter between the
//! two; nothing else flips signs implicitly.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("cell value {value} is not one of -1, 0, +1")]
pub struct InvalidCellValueError {
    value: i8,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid mark {input:?} (expected 'x' or 'o')")]
pub struct ParseMarkError {
    input: String,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("cell ({row}, {col}) is out of range (expected 0..3)")]
pub struct InvalidCellError {
    row: usize,
    col: usize,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ParseBoardError {
    #[display("expected 3 rows separated by '/', got {count}")]
    RowCount { count: usize },
    #[display("row {row} has {count} cells, expected 3")]
    RowLength { row: usize, count: usize },
    #[display("unexpected character {ch:?} (expected 'x', 'o' or '.')")]
    UnexpectedChar { ch: char },
}

#[derive(Debug, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PlayError {
    #[display("cell {cell} is already occupied")]
    Occupied { cell: Cell },
    #[display("game is already over")]
    GameOver,
}
