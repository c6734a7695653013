use std::collections::{HashMap, HashSet};

use noughts_engine::{Board, GameOutcome, Mark};
use noughts_evaluator::search::{BASE, SearchEngine};

/// Game value for the side to move (`1` win, `0` draw, `-1` loss) by plain
/// negamax, without pruning or move ordering.
fn perfect_value(board: &mut Board, to_move: Mark, memo: &mut HashMap<(Board, Mark), i8>) -> i8 {
    if let Some(outcome) = board.outcome() {
        return outcome.score_for(to_move);
    }
    if let Some(value) = memo.get(&(*board, to_move)) {
        return *value;
    }
    let mut best = -1;
    for cell in board.empty_cells() {
        board.set(cell, to_move);
        let value = -perfect_value(board, to_move.opponent(), memo);
        board.clear(cell);
        best = best.max(value);
    }
    memo.insert((*board, to_move), best);
    best
}

fn side_to_move(board: &Board) -> Mark {
    if board.count(Mark::X) > board.count(Mark::O) {
        Mark::O
    } else {
        Mark::X
    }
}

fn reachable_positions() -> Vec<Board> {
    let mut seen = HashSet::new();
    let mut stack = vec![Board::EMPTY];
    while let Some(board) = stack.pop() {
        if !seen.insert(board) || board.is_over() {
            continue;
        }
        let side = side_to_move(&board);
        for cell in board.empty_cells() {
            let mut next = board;
            next.set(cell, side);
            stack.push(next);
        }
    }
    seen.into_iter().filter(|board| !board.is_over()).collect()
}

#[test]
fn test_engine_move_preserves_game_value_everywhere() {
    let engine = SearchEngine::new();
    let mut memo = HashMap::new();
    let positions = reachable_positions();
    assert_eq!(positions.len(), 4520);

    for board in positions {
        let side = side_to_move(&board);
        let mut scratch = board;
        let expected = perfect_value(&mut scratch, side, &mut memo);

        let outcome = engine.search(&mut scratch, side).unwrap();
        assert_eq!(scratch, board, "search left marks behind on {board}");
        assert!(board.is_vacant(outcome.cell));

        let mut next = board;
        next.set(outcome.cell, side);
        let achieved = -perfect_value(&mut next, side.opponent(), &mut memo);
        assert_eq!(
            achieved, expected,
            "engine played {} on {board} for {side}",
            outcome.cell
        );
        assert_eq!(
            outcome.score.signum(),
            i32::from(expected),
            "score {} disagrees with game value on {board}",
            outcome.score
        );
    }
}

#[test]
fn test_engine_never_loses_to_any_line_of_play() {
    // the engine plays one side, every reply of the other side is tried
    fn explore(board: &mut Board, engine_side: Mark, to_move: Mark, engine: &SearchEngine) {
        if let Some(outcome) = board.outcome() {
            assert_ne!(
                outcome,
                GameOutcome::Win(engine_side.opponent()),
                "engine lost on {board}"
            );
            return;
        }
        if to_move == engine_side {
            let cell = engine.best_move(board, to_move).unwrap();
            board.set(cell, to_move);
            explore(board, engine_side, to_move.opponent(), engine);
            board.clear(cell);
        } else {
            for cell in board.empty_cells() {
                board.set(cell, to_move);
                explore(board, engine_side, to_move.opponent(), engine);
                board.clear(cell);
            }
        }
    }

    let engine = SearchEngine::new();
    for engine_side in Mark::ALL {
        explore(&mut Board::EMPTY, engine_side, Mark::X, &engine);
    }
}

#[test]
fn test_fastest_win_is_preferred() {
    // x can win at once on the top row, or set up a slower win elsewhere
    let board: Board = "xx./o../o..".parse().unwrap();
    let mut scratch = board;
    let outcome = SearchEngine::new().search(&mut scratch, Mark::X).unwrap();
    assert_eq!(outcome.cell.index(), 2);
    assert_eq!(outcome.score, BASE - 1);
}
