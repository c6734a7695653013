use std::{path::PathBuf, str::FromStr};

use anyhow::Context;
use noughts_engine::{
    core::{Cell, GameOutcome, Mark},
    engine::{GameSession, MatchStats},
};
use noughts_evaluator::{
    move_selector::{MoveSelector, RandomPlayer},
    opponent::StochasticOpponent,
    search::SearchEngine,
};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64;

use crate::util;

/// Who plays one side of a match.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub(crate) enum PlayerSpec {
    #[display("minimax")]
    Minimax,
    #[display("random")]
    Random,
    #[display("stochastic:{_0}")]
    Stochastic(f64),
    #[display("model:{}", _0.display())]
    Model(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid player {input:?}: expected minimax, random, stochastic:P or model:PATH")]
pub(crate) struct ParsePlayerError {
    input: String,
}

impl FromStr for PlayerSpec {
    type Err = ParsePlayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePlayerError {
            input: s.to_owned(),
        };
        match s.split_once(':') {
            None if s == "minimax" => Ok(Self::Minimax),
            None if s == "random" => Ok(Self::Random),
            Some(("stochastic", p)) => {
                let p = p.parse::<f64>().map_err(|_| err())?;
                if (0.0..=1.0).contains(&p) {
                    Ok(Self::Stochastic(p))
                } else {
                    Err(err())
                }
            }
            Some(("model", path)) if !path.is_empty() => Ok(Self::Model(PathBuf::from(path))),
            _ => Err(err()),
        }
    }
}

impl PlayerSpec {
    fn build(&self) -> anyhow::Result<Box<dyn MoveSelector>> {
        let player: Box<dyn MoveSelector> = match self {
            Self::Minimax => Box::new(SearchEngine::new()),
            Self::Random => Box::new(RandomPlayer),
            Self::Stochastic(p) => Box::new(StochasticOpponent::new(*p)?),
            Self::Model(path) => Box::new(util::read_model_file(path)?.to_network()?),
        };
        Ok(player)
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct MatchArg {
    /// Player for X: minimax, random, stochastic:P or model:PATH
    #[arg(long, default_value = "minimax")]
    x: PlayerSpec,
    /// Player for O: minimax, random, stochastic:P or model:PATH
    #[arg(long, default_value = "random")]
    o: PlayerSpec,
    /// Side that moves first in every game
    #[arg(long, default_value = "x")]
    first: Mark,
    /// Number of games to play
    #[arg(long, default_value_t = 100)]
    games: usize,
    /// Seed for reproducible games
    #[arg(long)]
    seed: Option<u64>,
}

pub(crate) fn run(arg: &MatchArg) -> anyhow::Result<()> {
    let x = arg.x.build().with_context(|| format!("Failed to set up X ({})", arg.x))?;
    let o = arg.o.build().with_context(|| format!("Failed to set up O ({})", arg.o))?;
    let mut rng = match arg.seed {
        Some(seed) => Pcg64::seed_from_u64(seed),
        None => Pcg64::from_rng(&mut rand::rng()),
    };

    let mut stats = MatchStats::new();
    for game in 0..arg.games {
        let session = play_game(x.as_ref(), o.as_ref(), arg.first, &mut rng)?;
        let outcome = session
            .outcome()
            .with_context(|| format!("Game {game} ended unfinished"))?;
        let moves = session
            .history()
            .iter()
            .map(|cell| cell.index().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        tracing::debug!(game, %outcome, %moves, "game finished");
        stats.record(outcome);
    }

    eprintln!(
        "X ({}) vs O ({}), {} opening, {} games:",
        arg.x,
        arg.o,
        arg.first,
        stats.games()
    );
    println!("  X wins: {}", stats.wins(Mark::X));
    println!("  O wins: {}", stats.wins(Mark::O));
    println!("  Draws:  {}", stats.draws());
    println!(
        "  Non-loss rate: X {:.1}%, O {:.1}%",
        stats.non_loss_rate(Mark::X) * 100.0,
        stats.non_loss_rate(Mark::O) * 100.0,
    );
    Ok(())
}

/// Plays one game to the end and returns the finished session.
fn play_game(
    x: &dyn MoveSelector,
    o: &dyn MoveSelector,
    first: Mark,
    rng: &mut dyn RngCore,
) -> anyhow::Result<GameSession> {
    let mut session = GameSession::starting_with(first);
    loop {
        if session.outcome().is_some() {
            return Ok(session);
        }
        let side = session.to_move();
        let player = match side {
            Mark::X => x,
            Mark::O => o,
        };
        let cell = player
            .select_move(session.board(), side, rng)
            .with_context(|| format!("{side} found no move on\n{}", session.board()))?;
        session
            .play(cell)
            .with_context(|| format!("{side} played an illegal move at {cell}"))?;
    }
}
