//! Exact game-tree search.
//!
//! [`SearchEngine`] runs minimax with alpha-beta pruning over the full game
//! tree (at most nine plies), so its moves are optimal: it never loses a
//! position that can be drawn and always converts a forced win.
//!
//! # Scoring
//!
//! Scores are relative to the side the search is run for:
//!
//! ```text
//! win  = +BASE - depth
//! loss = -BASE + depth
//! draw = 0
//! ```
//!
//! `depth` is the number of plies played since the searched position, so an
//! immediate win scores `BASE - 1`. The depth adjustment makes the engine
//! prefer the fastest win and the slowest loss.
//!
//! # Move Ordering
//!
//! Children are expanded in this order, which is what makes alpha-beta cut
//! early on most positions:
//!
//! 1. immediate wins for the side to move
//! 2. blocks of the opponent's immediate wins
//! 3. moves that create a fork (two winning threats at once)
//! 4. center
//! 5. corners
//! 6. edges
//!
//! Ordering never drops a move. Among moves with equal scores the first one in
//! this order is kept, so the same board always yields the same move.
//!
//! # Depth Limit
//!
//! [`SearchEngine::with_max_depth`] stops the recursion early and scores the
//! frontier with a positional heuristic (open lines, fork potential and
//! square weights). Heuristic scores stay strictly inside `(-BASE / 2, BASE / 2)`,
//! so a proven result always dominates a guess.

use noughts_engine::{Board, Cell, CellList, GameOutcome, LINES, Mark};

/// Magnitude of a win before the depth adjustment.
pub const BASE: i32 = 1000;

const HEURISTIC_LIMIT: i32 = BASE / 2 - 1;

const OPEN_TWO_SCORE: i32 = 200;
const OPEN_ONE_SCORE: i32 = 20;
const FORK_SCORE: i32 = 100;

/// Positional weight of each cell: center 5, corners 3, edges 2.
const SQUARE_WEIGHTS: [i32; Cell::COUNT] = [3, 2, 3, 2, 5, 2, 3, 2, 3];

/// Best move found by [`SearchEngine::search`] and its minimax score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    pub cell: Cell,
    pub score: i32,
}

/// Minimax search with alpha-beta pruning.
///
/// The engine is stateless between calls; it can be shared freely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchEngine {
    max_depth: Option<u8>,
}

impl SearchEngine {
    /// Creates an engine that searches to the end of the game.
    #[must_use]
    pub const fn new() -> Self {
        Self { max_depth: None }
    }

    /// Creates an engine that stops after `max_depth` plies (at least one).
    #[must_use]
    pub const fn with_max_depth(max_depth: u8) -> Self {
        let max_depth = if max_depth == 0 { 1 } else { max_depth };
        Self {
            max_depth: Some(max_depth),
        }
    }

    #[must_use]
    pub const fn max_depth(&self) -> Option<u8> {
        self.max_depth
    }

    /// Returns the best move for `side`, or `None` if the game is over.
    ///
    /// The given board is not modified.
    #[must_use]
    pub fn best_move(&self, board: &Board, side: Mark) -> Option<Cell> {
        let mut scratch = *board;
        self.search(&mut scratch, side).map(|outcome| outcome.cell)
    }

    /// Searches the position in place.
    ///
    /// Every mark placed during the search is removed again before this
    /// returns, so the board is left exactly as it was passed in.
    pub fn search(&self, board: &mut Board, side: Mark) -> Option<SearchOutcome> {
        if board.is_over() {
            return None;
        }

        let mut best: Option<SearchOutcome> = None;
        let mut alpha = i32::MIN;
        for cell in ordered_moves(board, side) {
            board.set(cell, side);
            let score = self.minimax(board, side, side.opponent(), 1, alpha, i32::MAX);
            board.clear(cell);

            // strict comparison keeps the earliest move on ties
            if best.is_none_or(|best| score > best.score) {
                best = Some(SearchOutcome { cell, score });
            }
            alpha = alpha.max(score);
        }
        best
    }

    /// Scores a finished board from `side`'s point of view.
    ///
    /// Returns `None` while the game is still in progress.
    #[must_use]
    pub fn evaluate_terminal(board: &Board, side: Mark, depth: u8) -> Option<i32> {
        let depth = i32::from(depth);
        board.outcome().map(|outcome| match outcome {
            GameOutcome::Win(winner) if winner == side => BASE - depth,
            GameOutcome::Win(_) => -BASE + depth,
            GameOutcome::Draw => 0,
        })
    }

    fn minimax(
        &self,
        board: &mut Board,
        me: Mark,
        to_move: Mark,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
    ) -> i32 {
        if let Some(score) = Self::evaluate_terminal(board, me, depth) {
            return score;
        }
        if self.max_depth.is_some_and(|max| depth >= max) {
            return positional_score(board, me);
        }

        let maximizing = to_move == me;
        let mut best = if maximizing { i32::MIN } else { i32::MAX };
        for cell in ordered_moves(board, to_move) {
            board.set(cell, to_move);
            let score = self.minimax(board, me, to_move.opponent(), depth + 1, alpha, beta);
            board.clear(cell);

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }
            if beta <= alpha {
                break;
            }
        }
        best
    }
}

/// Returns every empty cell, most promising first.
#[must_use]
pub fn ordered_moves(board: &Board, to_move: Mark) -> CellList {
    let mut moves = CellList::new();
    let mut push = |cell: Cell| {
        if board.is_vacant(cell) && !moves.contains(&cell) {
            moves.push(cell);
        }
    };

    for cell in board.winning_cells(to_move) {
        push(cell);
    }
    for cell in board.winning_cells(to_move.opponent()) {
        push(cell);
    }
    for cell in fork_cells(board, to_move) {
        push(cell);
    }
    push(Cell::CENTER);
    Cell::CORNERS.into_iter().for_each(&mut push);
    Cell::EDGES.into_iter().for_each(&mut push);
    moves
}

/// Empty cells where `mark` would create two or more immediate threats.
#[must_use]
pub fn fork_cells(board: &Board, mark: Mark) -> CellList {
    board
        .empty_cells()
        .into_iter()
        .filter(|cell| {
            let mut next = *board;
            next.set(*cell, mark);
            next.winning_cells(mark).len() >= 2
        })
        .collect()
}

/// Static evaluation of an unfinished board from `side`'s point of view.
fn positional_score(board: &Board, side: Mark) -> i32 {
    let score = potential(board, side) - potential(board, side.opponent());
    score.clamp(-HEURISTIC_LIMIT, HEURISTIC_LIMIT)
}

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn potential(board: &Board, mark: Mark) -> i32 {
    let values = board.relative_to(mark);
    let mut score = 0;

    for line in &LINES {
        let own = line.iter().filter(|c| values[c.index()] > 0).count();
        let other = line.iter().filter(|c| values[c.index()] < 0).count();
        match (own, other) {
            (2, 0) => score += OPEN_TWO_SCORE,
            (1, 0) => score += OPEN_ONE_SCORE,
            _ => {}
        }
    }

    score += FORK_SCORE * fork_cells(board, mark).len() as i32;

    for (value, weight) in values.iter().zip(SQUARE_WEIGHTS) {
        score += i32::from(*value) * weight;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(s: &str) -> Board {
        s.parse().unwrap()
    }

    fn cell(row: usize, col: usize) -> Cell {
        Cell::from_row_col(row, col).unwrap()
    }

    #[test]
    fn test_empty_board_takes_center() {
        let engine = SearchEngine::new();
        assert_eq!(engine.best_move(&Board::EMPTY, Mark::X), Some(Cell::CENTER));
    }

    #[test]
    fn test_terminal_scores_are_depth_adjusted() {
        let won = board("xxx/oo./...");
        assert_eq!(SearchEngine::evaluate_terminal(&won, Mark::X, 3), Some(BASE - 3));
        assert_eq!(SearchEngine::evaluate_terminal(&won, Mark::O, 3), Some(-BASE + 3));
        let drawn = board("xox/xoo/oxx");
        assert_eq!(SearchEngine::evaluate_terminal(&drawn, Mark::X, 9), Some(0));
        assert_eq!(SearchEngine::evaluate_terminal(&Board::EMPTY, Mark::X, 0), None);
    }

    #[test]
    fn test_finished_board_has_no_move() {
        let engine = SearchEngine::new();
        assert_eq!(engine.best_move(&board("xxx/oo./..."), Mark::O), None);
        assert_eq!(engine.best_move(&board("xox/xoo/oxx"), Mark::X), None);
    }

    #[test]
    fn test_search_restores_board() {
        let engine = SearchEngine::new();
        for text in ["x.o/.x./..o", ".../.o./..x", "xo./.../...", ".../.../..."] {
            let original = board(text);
            let mut scratch = original;
            let side = if original.count(Mark::X) > original.count(Mark::O) {
                Mark::O
            } else {
                Mark::X
            };
            engine.search(&mut scratch, side);
            assert_eq!(scratch, original, "board changed after searching {text}");
        }
    }

    #[test]
    fn test_blocks_immediate_threat() {
        // o threatens the middle of the right column
        let b = Board::from_rows([[1, 0, -1], [0, 1, 0], [0, 0, -1]]).unwrap();
        assert_eq!(SearchEngine::new().best_move(&b, Mark::X), Some(cell(1, 2)));

        // o threatens the bottom of the left column
        let b = Board::from_rows([[-1, 1, 0], [-1, 0, 0], [0, 0, 1]]).unwrap();
        assert_eq!(SearchEngine::new().best_move(&b, Mark::X), Some(cell(2, 0)));
    }

    #[test]
    fn test_takes_immediate_win() {
        let b = Board::from_rows([[1, 0, -1], [0, 1, 0], [-1, 0, 0]]).unwrap();
        let mut scratch = b;
        let outcome = SearchEngine::new().search(&mut scratch, Mark::X).unwrap();
        assert_eq!(outcome.cell, cell(2, 2));
        assert_eq!(outcome.score, BASE - 1);

        let b = Board::from_rows([[0, 0, -1], [1, 1, 0], [-1, 0, 0]]).unwrap();
        assert_eq!(SearchEngine::new().best_move(&b, Mark::X), Some(cell(1, 2)));
    }

    #[test]
    fn test_prefers_win_over_block() {
        // both sides threaten; winning now beats blocking
        let b = board("xx./oo./...");
        assert_eq!(SearchEngine::new().best_move(&b, Mark::X), Some(cell(0, 2)));
        assert_eq!(SearchEngine::new().best_move(&b, Mark::O), Some(cell(1, 2)));
    }

    #[test]
    fn test_search_is_deterministic() {
        let engine = SearchEngine::new();
        let b = board(".../.o./..x");
        let first = engine.best_move(&b, Mark::X);
        for _ in 0..5 {
            assert_eq!(engine.best_move(&b, Mark::X), first);
        }
    }

    #[test]
    fn test_ordering_keeps_every_move() {
        for text in [".../.../...", "x.o/.x./..o", "xo./.x./o..", "xox/oxo/..."] {
            let b = board(text);
            let mut moves = ordered_moves(&b, Mark::X).to_vec();
            moves.sort();
            assert_eq!(moves, b.empty_cells().to_vec(), "moves lost on {text}");
        }
    }

    #[test]
    fn test_ordering_priorities() {
        let b = board("xx./oo./...");
        let moves = ordered_moves(&b, Mark::X);
        assert_eq!(&moves[..2], &[cell(0, 2), cell(1, 2)]);

        // x on two opposite corners can fork on the remaining corners
        let b = board("x../.o./..x");
        assert!(fork_cells(&b, Mark::X).contains(&cell(0, 2)));
        let moves = ordered_moves(&Board::EMPTY, Mark::X);
        assert_eq!(moves[0], Cell::CENTER);
        assert_eq!(&moves[1..5], &Cell::CORNERS);
        assert_eq!(&moves[5..], &Cell::EDGES);
    }

    #[test]
    fn test_self_play_is_a_draw() {
        let engine = SearchEngine::new();
        let mut b = Board::EMPTY;
        let mut side = Mark::X;
        while let Some(cell) = engine.best_move(&b, side) {
            b.set(cell, side);
            side = side.opponent();
        }
        assert_eq!(b.outcome(), Some(GameOutcome::Draw));
    }

    #[test]
    fn test_depth_limited_search() {
        let shallow = SearchEngine::with_max_depth(1);
        let b = Board::from_rows([[1, 0, -1], [0, 1, 0], [-1, 0, 0]]).unwrap();
        assert_eq!(shallow.best_move(&b, Mark::X), Some(cell(2, 2)));

        let two_ply = SearchEngine::with_max_depth(2);
        let b = Board::from_rows([[-1, 1, 0], [-1, 0, 0], [0, 0, 1]]).unwrap();
        assert_eq!(two_ply.best_move(&b, Mark::X), Some(cell(2, 0)));

        let outcome = shallow.search(&mut Board::EMPTY, Mark::X).unwrap();
        assert!(outcome.score.abs() < BASE / 2);
        assert_eq!(SearchEngine::with_max_depth(0).max_depth(), Some(1));
    }

    #[test]
    fn test_positional_score_is_antisymmetric_and_bounded() {
        for text in ["x.o/.x./..o", ".../.x./...", "xo./.../..."] {
            let b = board(text);
            let x = positional_score(&b, Mark::X);
            let o = positional_score(&b, Mark::O);
            assert_eq!(x, -o);
            assert!(x.abs() <= HEURISTIC_LIMIT);
        }
        assert!(positional_score(&board(".../.x./..."), Mark::X) > 0);
    }
}
