use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::Context;
use chrono::Utc;
use noughts_training::{
    config::EvolutionConfig,
    evolver::{Evolver, GenerationReport, RunStatus},
};

use crate::{model::policy_model::PolicyModel, util};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Training configuration JSON file (missing fields keep their defaults)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of individuals per generation
    #[arg(long)]
    population: Option<usize>,
    /// Number of generations
    #[arg(long)]
    generations: Option<usize>,
    /// Games played per individual per generation
    #[arg(long)]
    games: Option<usize>,
    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
    /// Stop after the generation that exceeds this many seconds
    #[arg(long)]
    time_limit: Option<u64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl TrainArg {
    fn evolution_config(&self) -> anyhow::Result<EvolutionConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_config_file(path)?,
            None => EvolutionConfig::default(),
        };
        if let Some(population) = self.population {
            config.population_size = population;
        }
        if let Some(generations) = self.generations {
            config.generations = generations;
        }
        if let Some(games) = self.games {
            config.games_per_individual = games;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let config = arg.evolution_config()?;
    let fitness = config.fitness_evaluator();
    let evolver = Evolver::new(&config, &fitness).context("Invalid training configuration")?;
    let handle = evolver.handle().clone();

    let deadline = arg
        .time_limit
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    let result = evolver.run(|report| {
        print_report(report);
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            eprintln!("Time limit reached, stopping after this generation");
            handle.cancel();
        }
    })?;

    let Some(best) = result.best else {
        anyhow::bail!("Training ended before any generation was evaluated");
    };

    eprintln!("Best Individual:");
    eprintln!(
        "  {} from generation #{} => {:.3}",
        best.id, best.generation, best.fitness
    );

    let model = PolicyModel {
        name: "policy".to_owned(),
        trained_at: Utc::now(),
        status: result.status,
        generations_completed: result.generations_completed,
        final_fitness: best.fitness,
        topology: config.topology,
        weights: best.genome,
    };
    util::save_json(&model, arg.output.as_deref())?;

    eprintln!();
    match model.status {
        RunStatus::Completed => eprintln!("Model saved successfully"),
        RunStatus::Cancelled => eprintln!("Model saved (training stopped early)"),
    }
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!(
        "  Generations: {}/{}",
        model.generations_completed, config.generations
    );
    eprintln!("  Final fitness: {:.3}", model.final_fitness);
    eprintln!("  Weights: {} parameters", model.weights.len());

    Ok(())
}

fn print_report(report: &GenerationReport) {
    let GenerationReport {
        generation,
        best_fitness_so_far,
        generation_best,
        statistics,
        gene_diversity,
        mutation_active,
    } = report;
    let phase = if *mutation_active { "mutating" } else { "warm-up" };
    eprintln!("Generation #{generation} ({phase}):");
    eprintln!("  Fitness Stats:");
    eprintln!("    Min:    {:.3}", statistics.min);
    eprintln!("    Max:    {:.3}", statistics.max);
    eprintln!("    Mean:   {:.3}", statistics.mean);
    eprintln!("    Median: {:.3}", statistics.median);
    eprintln!("    Stddev: {:.3}", statistics.std_dev);
    eprintln!("  Generation best: {generation_best:.3}");
    eprintln!("  Best so far:     {best_fitness_so_far:.3}");
    eprintln!("  Gene diversity:  {gene_diversity:.3}");
}
