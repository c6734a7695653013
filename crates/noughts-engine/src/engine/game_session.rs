use crate::{
    PlayError,
    core::{Board, Cell, CellList, GameOutcome, Mark},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionState {
    Playing,
    Finished(GameOutcome),
}

/// A single game: the board plus whose turn it is.
///
/// Unlike [`Board::set`], [`GameSession::play`] validates its input and
/// reports occupied cells as a recoverable [`PlayError`].
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    to_move: Mark,
    history: CellList,
    state: SessionState,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    /// Starts a game on the empty board with `X` to move.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_with(Mark::X)
    }

    #[must_use]
    pub fn starting_with(first: Mark) -> Self {
        Self::from_board(Board::EMPTY, first)
    }

    /// Resumes a game from an arbitrary position.
    #[must_use]
    pub fn from_board(board: Board, to_move: Mark) -> Self {
        let state = match board.outcome() {
            Some(outcome) => SessionState::Finished(outcome),
            None => SessionState::Playing,
        };
        Self {
            board,
            to_move,
            history: CellList::new(),
            state,
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn to_move(&self) -> Mark {
        self.to_move
    }

    /// Cells played in this session, oldest first.
    #[must_use]
    pub fn history(&self) -> &[Cell] {
        &self.history
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn outcome(&self) -> Option<GameOutcome> {
        match self.state {
            SessionState::Playing => None,
            SessionState::Finished(outcome) => Some(outcome),
        }
    }

    /// Places the mark of the side to move on `cell` and passes the turn.
    ///
    /// Returns the outcome if this move ended the game.
    pub fn play(&mut self, cell: Cell) -> Result<Option<GameOutcome>, PlayError> {
        if self.state.is_finished() {
            return Err(PlayError::GameOver);
        }
        if !self.board.is_vacant(cell) {
            return Err(PlayError::Occupied { cell });
        }
        self.board.set(cell, self.to_move);
        self.history.push(cell);
        self.to_move = self.to_move.opponent();

        let outcome = self.board.outcome();
        if let Some(outcome) = outcome {
            self.state = SessionState::Finished(outcome);
        }
        Ok(outcome)
    }
}
