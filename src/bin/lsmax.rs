use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use log::info;

use lsmax::cnf::dimacs::load_dimacs;
use lsmax::local::anneal::AnnealConfig;
use lsmax::local::tabu::TabuConfig;
use lsmax::restart::{RestartConfig, Strategy, available_workers, run_restarts};
use lsmax::rng::entropy_seed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    Tabu,
    Sa,
}

#[derive(Debug, Parser)]
#[command(name = "lsmax")]
#[command(about = "Local-search weighted MAX-SAT solver")]
struct Cli {
    #[arg(value_enum)]
    strategy: StrategyArg,
    /// DIMACS .cnf or .wcnf file.
    path: PathBuf,
    #[arg(long)]
    workers: Option<usize>,
    #[arg(long, default_value_t = 100)]
    restarts: usize,
    #[arg(long, default_value_t = 100_000)]
    trials: u64,
    /// Base seed; drawn from the OS when omitted.
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 10)]
    tabu_len_limit: u64,
    #[arg(long, default_value_t = 1.0)]
    temperature: f64,
    #[arg(long, default_value_t = 0.99)]
    cooling: f64,
    /// Print the model as a DIMACS `v` line.
    #[arg(long, default_value_t = false)]
    dimacs_model: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    if !(cli.cooling > 0.0 && cli.cooling <= 1.0) {
        bail!("cooling must be in (0,1], got {}", cli.cooling);
    }
    if cli.temperature <= 0.0 {
        bail!("temperature must be positive, got {}", cli.temperature);
    }
    if cli.workers == Some(0) {
        bail!("workers must be at least 1");
    }

    let problem = load_dimacs(&cli.path)
        .with_context(|| format!("failed to parse {}", cli.path.display()))?;
    println!(
        "c parsed {} vars {} clauses",
        problem.num_vars,
        problem.num_clauses()
    );

    let strategy = match cli.strategy {
        StrategyArg::Tabu => Strategy::Tabu(TabuConfig {
            tabu_len_limit: cli.tabu_len_limit,
        }),
        StrategyArg::Sa => Strategy::Annealing(AnnealConfig {
            initial_temperature: cli.temperature,
            cooling: cli.cooling,
        }),
    };
    let config = RestartConfig {
        workers: cli.workers.unwrap_or_else(available_workers),
        restarts: cli.restarts,
        trials: cli.trials,
        seed: cli.seed.unwrap_or_else(entropy_seed),
    };
    info!(
        "strategy={} workers={} restarts={} trials={} seed={}",
        strategy.name(),
        config.workers,
        config.restarts,
        config.trials,
        config.seed
    );

    let report = run_restarts(&problem, &config, strategy, |solution| {
        println!("o {}", solution.score);
    });

    match report.best {
        Some(best) => {
            info!(
                "best score {} leaves {} clauses unsatisfied",
                best.score,
                best.model.unsat_clauses(&problem).len()
            );
            if cli.dimacs_model {
                println!("{}", best.model.to_dimacs_line());
            } else {
                println!("{}", best.model);
            }
        }
        None => println!("[]"),
    }
    Ok(())
}
