//! Averaging trials under sequential, thread-pool and process-pool execution
mod plan;
mod process;

pub use plan::{Batch, BatchPlan};
pub use process::{serve, BatchReply, BatchRequest, ProcessPool};

use crate::experiment::Experiment;
use crate::result::{Error, ErrorKind, Result};
use crate::sampler::{batch_rng, resolve_seed, UniformInt};
use num::BigUint;
use rayon::prelude::*;
use std::time::{Duration, Instant};

/// Trials per batch used when none is given
pub const DEFAULT_BATCH_SIZE: u64 = 100;

/// How the batches of an estimate are executed.
///
/// Every strategy evaluates the same plan with the same per-batch random
/// streams, so for a fixed seed they all return the same total.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// All batches in order on the calling thread
    Sequential { batch_size: u64 },
    /// Batches spread over a pool of `workers` threads
    Threads { workers: usize, batch_size: u64 },
    /// Batches spread over child processes
    Processes(ProcessPool),
}

impl Strategy {
    /// Sequential execution with the default batch size
    pub fn sequential() -> Self {
        Strategy::Sequential {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn batch_size(&self) -> u64 {
        match self {
            Strategy::Sequential { batch_size } => *batch_size,
            Strategy::Threads { batch_size, .. } => *batch_size,
            Strategy::Processes(pool) => pool.batch_size,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Sequential { .. } => "sequential",
            Strategy::Threads { .. } => "threads",
            Strategy::Processes(_) => "processes",
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::sequential()
    }
}

/// Outcome of one estimate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Estimate {
    /// Sum of all trial values
    pub total: u64,
    /// Number of trials
    pub trials: u64,
    /// Master seed the batch streams were derived from
    pub seed: u64,
    /// Wall-clock time spent evaluating trials
    pub elapsed: Duration,
}

impl Estimate {
    /// Empirical probability or expected value, `total / trials`
    pub fn mean(&self) -> f64 {
        self.total as f64 / self.trials as f64
    }
}

/// Estimate the mean trial value of `exp` over `[1, n]`.
///
/// When `seed` is `None` a master seed is drawn from process entropy; it is
/// returned in the [`Estimate`] so the run can be repeated.
///
/// # Errors
///
/// - `NoTrials` if `trials` is zero
/// - `InvalidParameter` if `n`, the batch size, or the worker count is zero
/// - `WorkerFailed` if any batch fails; the estimate is abandoned
///
/// # Example
///
/// ```rust
/// # use ntsim::aggregate::{estimate, Strategy};
/// use ntsim::experiment::RemainderBelowHalf;
/// use num::BigUint;
///
/// let n = BigUint::from(10_u32).pow(20);
/// let seq = estimate(&RemainderBelowHalf, &n, 1_000, &Strategy::sequential(), Some(3)).unwrap();
/// let par = estimate(
///     &RemainderBelowHalf,
///     &n,
///     1_000,
///     &Strategy::Threads { workers: 4, batch_size: 100 },
///     Some(3),
/// )
/// .unwrap();
///
/// assert_eq!(seq.total, par.total);
/// ```
pub fn estimate<E: Experiment>(
    exp: &E,
    n: &BigUint,
    trials: u64,
    strategy: &Strategy,
    seed: Option<u64>,
) -> Result<Estimate> {
    let plan = BatchPlan::new(trials, strategy.batch_size())?;
    let u = UniformInt::new(n.clone())?;
    let seed = resolve_seed(seed);

    tracing::debug!(
        experiment = %exp.kind(),
        strategy = strategy.name(),
        trials,
        batches = plan.len(),
        seed,
        "estimating"
    );

    let start = Instant::now();
    let total = match strategy {
        Strategy::Sequential { .. } => plan
            .iter()
            .map(|b| run_batch(exp, &u, seed, b))
            .sum::<u64>(),
        Strategy::Threads { workers, .. } => {
            run_threads(exp, &u, seed, &plan, *workers)?
        }
        Strategy::Processes(pool) => pool.run(exp.kind(), n, seed, &plan)?,
    };

    Ok(Estimate {
        total,
        trials,
        seed,
        elapsed: start.elapsed(),
    })
}

fn run_batch<E: Experiment>(exp: &E, u: &UniformInt, seed: u64, b: Batch) -> u64 {
    let total = exp.run_batch(u, b.len, &mut batch_rng(seed, b.index));
    tracing::trace!(index = b.index, len = b.len, total, "batch done");
    total
}

fn run_threads<E: Experiment>(
    exp: &E,
    u: &UniformInt,
    seed: u64,
    plan: &BatchPlan,
    workers: usize,
) -> Result<u64> {
    if workers == 0 {
        return Err(Error::new(
            ErrorKind::InvalidParameter,
            "worker count must be positive",
        ));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("ntsim-worker-{i}"))
        .build()?;

    // batches are produced by index as workers claim them
    let total = pool.install(|| {
        (0..plan.len())
            .into_par_iter()
            .map(|ix| run_batch(exp, u, seed, plan.batch(ix)))
            .sum::<u64>()
    });

    Ok(total)
}
