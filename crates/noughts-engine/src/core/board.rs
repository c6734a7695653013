use std::{fmt, str::FromStr};

use arrayvec::ArrayVec;

use crate::{
    InvalidCellValueError, ParseBoardError,
    core::cell::{Cell, LINES, Mark},
};

/// Up to nine cells, kept on the stack.
pub type CellList = ArrayVec<Cell, { Cell::COUNT }>;

/// Final result of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum GameOutcome {
    #[display("{_0} wins")]
    Win(Mark),
    #[display("draw")]
    Draw,
}

impl GameOutcome {
    /// Result from `mark`'s point of view: `1` for a win, `0` for a draw, `-1` for a loss.
    #[must_use]
    pub fn score_for(self, mark: Mark) -> i8 {
        match self {
            Self::Win(winner) if winner == mark => 1,
            Self::Win(_) => -1,
            Self::Draw => 0,
        }
    }
}

/// The 3×3 grid.
///
/// Cells hold absolute values: `+1` for [`Mark::X`], `-1` for [`Mark::O`] and
/// `0` for empty. The board does not track whose turn it is; see
/// [`GameSession`](crate::GameSession) for that.
///
/// # Text Form
///
/// Boards print and parse as three rows separated by `/`, using `x`, `o` and
/// `.` for empty:
///
/// ```
/// use noughts_engine::{Board, Mark};
///
/// let board: Board = "x.o/.x./..o".parse().unwrap();
/// assert_eq!(board.count(Mark::X), 2);
/// assert_eq!(board.to_string(), "x.o/.x./..o");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board {
    values: [i8; Cell::COUNT],
}

impl Board {
    pub const EMPTY: Self = Self {
        values: [0; Cell::COUNT],
    };

    /// Creates a board from row-major absolute values.
    pub fn from_values(values: [i8; Cell::COUNT]) -> Result<Self, InvalidCellValueError> {
        if let Some(&value) = values.iter().find(|v| !(-1..=1).contains(*v)) {
            return Err(InvalidCellValueError { value });
        }
        Ok(Self { values })
    }

    /// Creates a board from a 3×3 matrix of absolute values.
    pub fn from_rows(rows: [[i8; 3]; 3]) -> Result<Self, InvalidCellValueError> {
        let mut values = [0; Cell::COUNT];
        for (slot, value) in values.iter_mut().zip(rows.iter().flatten()) {
            *slot = *value;
        }
        Self::from_values(values)
    }

    #[must_use]
    pub fn values(&self) -> &[i8; Cell::COUNT] {
        &self.values
    }

    #[must_use]
    pub fn get(&self, cell: Cell) -> Option<Mark> {
        Mark::from_sign(self.values[cell.index()])
    }

    #[must_use]
    pub fn is_vacant(&self, cell: Cell) -> bool {
        self.values[cell.index()] == 0
    }

    /// Puts `mark` on an empty cell.
    ///
    /// # Panics
    ///
    /// Panics if the cell is occupied. Callers that accept untrusted moves must
    /// check [`Board::is_vacant`] first (or go through
    /// [`GameSession::play`](crate::GameSession::play)).
    pub fn set(&mut self, cell: Cell, mark: Mark) {
        assert!(self.is_vacant(cell), "cell {cell} is already occupied");
        self.values[cell.index()] = mark.sign();
    }

    /// Empties a cell. Used to undo a [`Board::set`].
    pub fn clear(&mut self, cell: Cell) {
        self.values[cell.index()] = 0;
    }

    #[must_use]
    pub fn empty_cells(&self) -> CellList {
        Cell::all().filter(|cell| self.is_vacant(*cell)).collect()
    }

    #[must_use]
    pub fn empty_count(&self) -> usize {
        self.values.iter().filter(|v| **v == 0).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.empty_count() == Cell::COUNT
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.empty_count() == 0
    }

    #[must_use]
    pub fn count(&self, mark: Mark) -> usize {
        self.values.iter().filter(|v| **v == mark.sign()).count()
    }

    /// Returns `true` if the mark counts are those of alternating play from
    /// empty with `X` first: `count(X) - count(O)` is `0` or `1`.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        let x = self.count(Mark::X);
        let o = self.count(Mark::O);
        x == o || x == o + 1
    }

    #[must_use]
    pub fn winner(&self) -> Option<Mark> {
        LINES.iter().find_map(|line| {
            let sum: i8 = line.iter().map(|cell| self.values[cell.index()]).sum();
            match sum {
                3 => Some(Mark::X),
                -3 => Some(Mark::O),
                _ => None,
            }
        })
    }

    /// Returns the outcome if the game is over, `None` while it continues.
    #[must_use]
    pub fn outcome(&self) -> Option<GameOutcome> {
        if let Some(mark) = self.winner() {
            return Some(GameOutcome::Win(mark));
        }
        self.is_full().then_some(GameOutcome::Draw)
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.outcome().is_some()
    }

    /// Returns `true` if putting `mark` on the (empty) `cell` completes a line.
    #[must_use]
    pub fn completes_line(&self, cell: Cell, mark: Mark) -> bool {
        cell.lines().any(|line| {
            line.iter()
                .all(|c| *c == cell || self.values[c.index()] == mark.sign())
        })
    }

    /// Empty cells where `mark` would win immediately.
    #[must_use]
    pub fn winning_cells(&self, mark: Mark) -> CellList {
        Cell::all()
            .filter(|cell| self.is_vacant(*cell) && self.completes_line(*cell, mark))
            .collect()
    }

    /// Encodes the board from `mark`'s point of view: own marks `+1`,
    /// opponent marks `-1`, empty `0`.
    #[must_use]
    pub fn relative_to(&self, mark: Mark) -> [i8; Cell::COUNT] {
        self.values.map(|v| v * mark.sign())
    }

    /// Swaps the ownership of every mark.
    #[must_use]
    pub fn inverted(&self) -> Self {
        Self {
            values: self.values.map(|v| -v),
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, values) in self.values.chunks(3).enumerate() {
            if row > 0 {
                f.write_str("/")?;
            }
            for value in values {
                let ch = match Mark::from_sign(*value) {
                    Some(mark) => mark.to_string(),
                    None => ".".to_owned(),
                };
                f.write_str(&ch)?;
            }
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows = s.trim().split('/').collect::<Vec<_>>();
        if rows.len() != 3 {
            return Err(ParseBoardError::RowCount { count: rows.len() });
        }
        let mut values = [0; Cell::COUNT];
        for (row, text) in rows.iter().enumerate() {
            let count = text.chars().count();
            if count != 3 {
                return Err(ParseBoardError::RowLength { row, count });
            }
            for (col, ch) in text.chars().enumerate() {
                values[row * 3 + col] = match ch {
                    'x' | 'X' => Mark::X.sign(),
                    'o' | 'O' => Mark::O.sign(),
                    '.' | '_' | '-' => 0,
                    _ => return Err(ParseBoardError::UnexpectedChar { ch }),
                };
            }
        }
        Ok(Self { values })
    }
}
