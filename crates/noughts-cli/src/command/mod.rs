use clap::{Parser, Subcommand};

use self::{best_move::BestMoveArg, play_match::MatchArg, train::TrainArg};

mod best_move;
mod play_match;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Train a policy network using genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Print the search engine's move for a position
    BestMove(#[clap(flatten)] BestMoveArg),
    /// Play games between two players and print the results
    Match(#[clap(flatten)] MatchArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::BestMove(arg) => best_move::run(&arg)?,
        Mode::Match(arg) => play_match::run(&arg)?,
    }
    Ok(())
}
