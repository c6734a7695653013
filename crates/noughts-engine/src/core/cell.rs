use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{InvalidCellError, ParseMarkError};

/// A player's mark.
///
/// `X` is encoded as `+1` and `O` as `-1` in absolute board values.
/// `X` moves first in a game started from the empty board.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    derive_more::Display,
    Serialize,
    Deserialize,
)]
pub enum Mark {
    #[display("x")]
    X,
    #[display("o")]
    O,
}

impl Mark {
    pub const ALL: [Self; 2] = [Self::X, Self::O];

    /// Absolute board value of this mark.
    #[must_use]
    pub const fn sign(self) -> i8 {
        match self {
            Self::X => 1,
            Self::O => -1,
        }
    }

    #[must_use]
    pub const fn from_sign(value: i8) -> Option<Self> {
        match value {
            1 => Some(Self::X),
            -1 => Some(Self::O),
            _ => None,
        }
    }

    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }
}

impl FromStr for Mark {
    type Err = ParseMarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" | "X" => Ok(Self::X),
            "o" | "O" => Ok(Self::O),
            _ => Err(ParseMarkError {
                input: s.to_owned(),
            }),
        }
    }
}

/// A square of the 3×3 grid, stored as a row-major index in `0..9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell(u8);

impl Cell {
    pub const COUNT: usize = 9;

    pub const CENTER: Self = Self(4);
    pub const CORNERS: [Self; 4] = [Self(0), Self(2), Self(6), Self(8)];
    pub const EDGES: [Self; 4] = [Self(1), Self(3), Self(5), Self(7)];

    /// Creates a cell from a row-major index. Returns `None` if `index >= 9`.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    #[expect(clippy::cast_possible_truncation)]
    pub const fn from_row_col(row: usize, col: usize) -> Result<Self, InvalidCellError> {
        if row < 3 && col < 3 {
            Ok(Self((row * 3 + col) as u8))
        } else {
            Err(InvalidCellError { row, col })
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub const fn row(self) -> usize {
        self.index() / 3
    }

    #[must_use]
    pub const fn col(self) -> usize {
        self.index() % 3
    }

    /// Iterates over all cells in row-major order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::COUNT).filter_map(Self::from_index)
    }

    /// Returns the winning lines passing through this cell.
    pub fn lines(self) -> impl Iterator<Item = &'static [Cell; 3]> {
        LINES.iter().filter(move |line| line.contains(&self))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row(), self.col())
    }
}

/// The eight winning lines: three rows, three columns, two diagonals.
pub static LINES: [[Cell; 3]; 8] = [
    [Cell(0), Cell(1), Cell(2)],
    [Cell(3), Cell(4), Cell(5)],
    [Cell(6), Cell(7), Cell(8)],
    [Cell(0), Cell(3), Cell(6)],
    [Cell(1), Cell(4), Cell(7)],
    [Cell(2), Cell(5), Cell(8)],
    [Cell(0), Cell(4), Cell(8)],
    [Cell(6), Cell(4), Cell(2)],
];
