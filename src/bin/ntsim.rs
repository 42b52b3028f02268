//! `ntsim`: compare Monte Carlo estimates with their closed-form limits.
//!
//! # Usage
//!
//! ```bash
//! ntsim coprime --trials 20000 --seed 7
//! ntsim division-count --base 10^50 --count 11 --plot divisions.svg
//! ntsim square-free --strategy processes --workers 4 -v
//! ```
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use ntsim::aggregate::{serve, ProcessPool, Strategy};
use ntsim::config::{parse_biguint, SweepConfig, DEFAULT_WORKERS};
use ntsim::experiment::{AnyExperiment, ExperimentKind};
use ntsim::plot::plot_series;
use ntsim::report;
use ntsim::result::Result;
use ntsim::sweep::sweep_with;
use num::BigUint;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "ntsim",
    version,
    about = "Monte Carlo estimates of number-theoretic constants",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// More logging on stderr (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mean number of division steps of the Euclidean algorithm
    DivisionCount(RunArgs),
    /// Probability that two random integers are coprime
    Coprime(RunArgs),
    /// Probability that N mod m is below m / 2
    Remainder(RunArgs),
    /// Probability that a random integer is square-free
    SquareFree(RunArgs),
    /// Serve batch requests from stdin (process pool child)
    #[command(hide = true)]
    Worker(WorkerArgs),
}

/// Overrides of the experiment's default sweep
#[derive(Args, Debug)]
struct RunArgs {
    /// First N, as digits or a power such as 10^100
    #[arg(long, value_name = "N", value_parser = parse_biguint)]
    base: Option<BigUint>,

    /// Number of N values
    #[arg(long)]
    count: Option<u64>,

    /// Distance between consecutive N values
    #[arg(long)]
    step: Option<u64>,

    /// Trials per N
    #[arg(long)]
    trials: Option<u64>,

    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Threads or processes for the parallel strategies
    #[arg(long)]
    workers: Option<usize>,

    /// Trials per batch
    #[arg(long)]
    batch_size: Option<u64>,

    /// Master seed; drawn from entropy when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Square-free memo entries, 0 disables the memo
    #[arg(long)]
    cache_capacity: Option<usize>,

    /// Write an SVG chart of the sweep to this path
    #[arg(long, value_name = "FILE")]
    plot: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct WorkerArgs {
    #[arg(long)]
    experiment: ExperimentKind,

    #[arg(long, value_parser = parse_biguint)]
    n: BigUint,

    #[arg(long)]
    seed: u64,

    #[arg(long, default_value_t = ntsim::cache::DEFAULT_CAPACITY)]
    cache_capacity: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    Sequential,
    Threads,
    Processes,
}

impl Command {
    fn execute(self) -> Result<()> {
        match self {
            Command::DivisionCount(args) => run(ExperimentKind::DivisionCount, args),
            Command::Coprime(args) => run(ExperimentKind::Coprime, args),
            Command::Remainder(args) => run(ExperimentKind::Remainder, args),
            Command::SquareFree(args) => run(ExperimentKind::SquareFree, args),
            Command::Worker(args) => work(args),
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn configure(kind: ExperimentKind, args: &RunArgs) -> Result<SweepConfig> {
    let mut config = SweepConfig::for_experiment(kind);
    if let Some(base) = &args.base {
        config.base = base.clone();
    }
    if let Some(count) = args.count {
        config.count = count;
    }
    if let Some(step) = args.step {
        config.step = step;
    }
    if let Some(trials) = args.trials {
        config.trials = trials;
    }
    if let Some(cache_capacity) = args.cache_capacity {
        config.cache_capacity = cache_capacity;
    }
    config.seed = args.seed;
    config.strategy = strategy(&config, args)?;
    config.validate()?;
    Ok(config)
}

// Flags override the experiment's default strategy piecewise
fn strategy(config: &SweepConfig, args: &RunArgs) -> Result<Strategy> {
    let default = &config.strategy;
    let batch_size = args.batch_size.unwrap_or_else(|| default.batch_size());
    let (default_kind, default_workers) = match default {
        Strategy::Sequential { .. } => (StrategyArg::Sequential, DEFAULT_WORKERS),
        Strategy::Threads { workers, .. } => (StrategyArg::Threads, *workers),
        Strategy::Processes(pool) => (StrategyArg::Processes, pool.workers),
    };
    let workers = args.workers.unwrap_or(default_workers);

    let strategy = match args.strategy.unwrap_or(default_kind) {
        StrategyArg::Sequential => Strategy::Sequential { batch_size },
        StrategyArg::Threads => Strategy::Threads {
            workers,
            batch_size,
        },
        StrategyArg::Processes => Strategy::Processes(
            ProcessPool::new(workers)?
                .batch_size(batch_size)
                .cache_capacity(config.cache_capacity),
        ),
    };
    Ok(strategy)
}

fn run(kind: ExperimentKind, args: RunArgs) -> Result<()> {
    let config = configure(kind, &args)?;
    info!(
        experiment = %kind,
        base = %config.base,
        count = config.count,
        trials = config.trials,
        strategy = config.strategy.name(),
        "starting sweep"
    );

    let exp = AnyExperiment::new(kind, config.cache_capacity)?;
    let precision = kind.precision();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut written = Ok(());
    let series = sweep_with(&exp, &config, |c| {
        if written.is_ok() {
            written = report::write_comparison(&mut out, c, precision);
        }
    })?;
    written?;
    report::write_summary(&mut out, &series)?;
    out.flush()?;

    if let Some(path) = &args.plot {
        plot_series(&series, path)?;
    }
    Ok(())
}

fn work(args: WorkerArgs) -> Result<()> {
    let exp = AnyExperiment::new(args.experiment, args.cache_capacity)?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    let served = serve(&exp, &args.n, args.seed, stdin.lock(), stdout.lock())?;
    debug!(served, experiment = %args.experiment, "worker done");
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = cli.command.execute() {
        eprintln!("ntsim: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "ntsim",
            "coprime",
            "--base",
            "10^20",
            "--count",
            "3",
            "--trials",
            "50",
            "--strategy",
            "threads",
            "--workers",
            "2",
            "--seed",
            "4",
        ])
        .unwrap();
        let Command::Coprime(args) = cli.command else {
            panic!("expected the coprime subcommand");
        };
        let config = configure(ExperimentKind::Coprime, &args).unwrap();

        assert_eq!(config.base, BigUint::from(10_u32).pow(20));
        assert_eq!(config.count, 3);
        assert_eq!(config.step, 1);
        assert_eq!(config.trials, 50);
        assert_eq!(config.seed, Some(4));
        assert_eq!(
            config.strategy,
            Strategy::Threads {
                workers: 2,
                batch_size: 100
            }
        );
    }

    #[test]
    fn square_free_keeps_threaded_default() {
        let cli = Cli::try_parse_from(["ntsim", "square-free", "--batch-size", "10"]).unwrap();
        let Command::SquareFree(args) = cli.command else {
            panic!("expected the square-free subcommand");
        };
        let config = configure(ExperimentKind::SquareFree, &args).unwrap();
        assert_eq!(
            config.strategy,
            Strategy::Threads {
                workers: DEFAULT_WORKERS,
                batch_size: 10
            }
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(Cli::try_parse_from(["ntsim", "coprime", "--base", "lots"]).is_err());
        assert!(Cli::try_parse_from(["ntsim", "coprime", "--strategy", "gpu"]).is_err());

        let cli = Cli::try_parse_from(["ntsim", "remainder", "--trials", "0"]).unwrap();
        let Command::Remainder(args) = cli.command else {
            panic!("expected the remainder subcommand");
        };
        assert!(configure(ExperimentKind::Remainder, &args).is_err());
    }

    #[test]
    fn worker_arguments_parse() {
        let cli = Cli::try_parse_from([
            "ntsim",
            "worker",
            "--experiment",
            "square-free",
            "--n",
            "1000000000000000000",
            "--seed",
            "9",
        ])
        .unwrap();
        let Command::Worker(args) = cli.command else {
            panic!("expected the worker subcommand");
        };
        assert_eq!(args.experiment, ExperimentKind::SquareFree);
        assert_eq!(args.n, BigUint::from(10_u64.pow(18)));
        assert_eq!(args.cache_capacity, ntsim::cache::DEFAULT_CAPACITY);
    }
}
