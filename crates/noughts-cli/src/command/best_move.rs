use noughts_engine::core::{Board, Mark};
use noughts_evaluator::search::{self, SearchEngine};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct BestMoveArg {
    /// Board as three rows of `x`, `o` or `.`, e.g. "x.o/.x./..o"
    #[arg(long)]
    board: Board,
    /// Side to move (inferred from the mark counts if omitted)
    #[arg(long)]
    side: Option<Mark>,
    /// Limit the search depth (plies)
    #[arg(long)]
    depth: Option<u8>,
}

pub(crate) fn run(arg: &BestMoveArg) -> anyhow::Result<()> {
    let BestMoveArg { board, side, depth } = arg;
    if let Some(outcome) = board.outcome() {
        anyhow::bail!("The game is already over: {outcome}");
    }
    let side = side.unwrap_or_else(|| side_to_move(board));
    let engine = depth.map_or_else(SearchEngine::new, SearchEngine::with_max_depth);

    let mut scratch = *board;
    let Some(best) = engine.search(&mut scratch, side) else {
        anyhow::bail!("No legal move for {side}");
    };

    eprintln!("{board}");
    eprintln!("Side to move: {side}");
    println!(
        "{side} plays {} (row {}, col {}), score {} [{}]",
        best.cell,
        best.cell.row(),
        best.cell.col(),
        best.score,
        verdict(best.score),
    );
    Ok(())
}

/// X moves first, so O is to move whenever X has more marks.
fn side_to_move(board: &Board) -> Mark {
    if board.count(Mark::X) > board.count(Mark::O) {
        Mark::O
    } else {
        Mark::X
    }
}

fn verdict(score: i32) -> &'static str {
    if score >= search::BASE / 2 {
        "winning"
    } else if score <= -search::BASE / 2 {
        "losing"
    } else if score == 0 {
        "drawn"
    } else {
        "heuristic"
    }
}
