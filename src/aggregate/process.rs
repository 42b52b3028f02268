//! Process pool: batches evaluated by `ntsim worker` children over a JSON
//! line protocol on their stdin/stdout.
use super::{Batch, BatchPlan, DEFAULT_BATCH_SIZE};
use crate::cache::DEFAULT_CAPACITY;
use crate::experiment::{Experiment, ExperimentKind};
use crate::result::{Error, ErrorKind, Result};
use crate::sampler::{batch_rng, UniformInt};
use num::BigUint;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Ask a worker to evaluate one batch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub index: u64,
    pub len: u64,
}

/// A worker's answer to a [`BatchRequest`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReply {
    pub index: u64,
    pub total: u64,
}

impl From<Batch> for BatchRequest {
    fn from(b: Batch) -> Self {
        BatchRequest {
            index: b.index,
            len: b.len,
        }
    }
}

/// A pool of worker processes running `<program> worker ...`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessPool {
    /// Number of child processes
    pub workers: usize,
    /// Trials per batch
    pub batch_size: u64,
    /// Executable providing the `worker` subcommand
    pub program: PathBuf,
    /// Square-free cache capacity inside each child
    pub cache_capacity: usize,
}

impl ProcessPool {
    /// Pool re-running the current executable as its workers
    pub fn new(workers: usize) -> Result<Self> {
        let program = std::env::current_exe()?;
        Ok(Self::with_program(workers, program))
    }

    pub fn with_program(workers: usize, program: impl Into<PathBuf>) -> Self {
        ProcessPool {
            workers,
            batch_size: DEFAULT_BATCH_SIZE,
            program: program.into(),
            cache_capacity: DEFAULT_CAPACITY,
        }
    }

    pub fn batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn cache_capacity(mut self, cache_capacity: usize) -> Self {
        self.cache_capacity = cache_capacity;
        self
    }

    /// Evaluate every batch of `plan` and return the summed total.
    ///
    /// Each child is driven by its own coordinator thread, which claims the
    /// next batch index from a shared cursor and keeps a running total of
    /// its answers. Batches are never listed up front. The first failure
    /// stops every coordinator from claiming further batches and is
    /// returned.
    pub fn run(
        &self,
        kind: ExperimentKind,
        n: &BigUint,
        seed: u64,
        plan: &BatchPlan,
    ) -> Result<u64> {
        if self.workers == 0 {
            return Err(Error::new(
                ErrorKind::InvalidParameter,
                "worker count must be positive",
            ));
        }

        let n_children = usize::try_from(plan.len()).map_or(self.workers, |b| self.workers.min(b));
        let shared = Shared {
            plan,
            cursor: AtomicU64::new(0),
            answered: AtomicU64::new(0),
            failed: AtomicBool::new(false),
        };

        tracing::debug!(
            workers = n_children,
            program = %self.program.display(),
            "starting worker processes"
        );

        let totals = std::thread::scope(|s| {
            let handles: Vec<_> = (0..n_children)
                .map(|id| {
                    let shared = &shared;
                    s.spawn(move || {
                        let res = self.drive(id, kind, n, seed, shared);
                        if res.is_err() {
                            shared.failed.store(true, Ordering::SeqCst);
                        }
                        res
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|h| {
                    h.join().map_err(|_| {
                        Error::new(ErrorKind::WorkerFailed, "coordinator thread panicked")
                    })?
                })
                .collect::<Result<Vec<u64>>>()
        })?;

        let answered = shared.answered.load(Ordering::SeqCst);
        if answered != plan.len() {
            return Err(Error::new(
                ErrorKind::WorkerFailed,
                &format!("{answered} of {} batches were evaluated", plan.len()),
            ));
        }
        Ok(totals.into_iter().sum())
    }

    fn spawn(
        &self,
        kind: ExperimentKind,
        n: &BigUint,
        seed: u64,
    ) -> Result<Child> {
        let child = Command::new(&self.program)
            .arg("worker")
            .arg("--experiment")
            .arg(kind.as_str())
            .arg("--n")
            .arg(n.to_string())
            .arg("--seed")
            .arg(seed.to_string())
            .arg("--cache-capacity")
            .arg(self.cache_capacity.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;
        Ok(child)
    }

    // Total of the batches answered by child `id`
    fn drive(
        &self,
        id: usize,
        kind: ExperimentKind,
        n: &BigUint,
        seed: u64,
        shared: &Shared,
    ) -> Result<u64> {
        let failed = |err: Error| match err.kind() {
            ErrorKind::Io => Error::new(
                ErrorKind::WorkerFailed,
                &format!("worker {id}: {}", err.description()),
            ),
            _ => err,
        };

        let mut child = self.spawn(kind, n, seed).map_err(failed)?;
        let total = match exchange(&mut child, shared) {
            Ok(total) => total,
            Err(err) => {
                // a worker that misbehaved may still be running
                let _ = child.kill();
                let _ = child.wait();
                return Err(failed(err));
            }
        };

        // closing stdin (dropped in `exchange`) lets a healthy worker exit
        let status = child.wait().map_err(|err| failed(err.into()))?;
        if status.success() {
            tracing::debug!(worker = id, total, "worker finished");
            Ok(total)
        } else {
            Err(Error::new(
                ErrorKind::WorkerFailed,
                &format!("worker {id} exited with {status}"),
            ))
        }
    }
}

struct Shared<'a> {
    plan: &'a BatchPlan,
    cursor: AtomicU64,
    answered: AtomicU64,
    failed: AtomicBool,
}

fn exchange(child: &mut Child, shared: &Shared) -> Result<u64> {
    let missing = || Error::new(ErrorKind::WorkerFailed, "worker pipes unavailable");
    let mut stdin = child.stdin.take().ok_or_else(missing)?;
    let mut stdout = BufReader::new(child.stdout.take().ok_or_else(missing)?);
    let mut line = String::new();
    let mut total = 0_u64;

    loop {
        if shared.failed.load(Ordering::SeqCst) {
            return Ok(total);
        }
        let ix = shared.cursor.fetch_add(1, Ordering::SeqCst);
        if ix >= shared.plan.len() {
            return Ok(total);
        }
        let batch = shared.plan.batch(ix);

        serde_json::to_writer(&mut stdin, &BatchRequest::from(batch))?;
        stdin.write_all(b"\n")?;
        stdin.flush()?;

        line.clear();
        if stdout.read_line(&mut line)? == 0 {
            return Err(Error::new(
                ErrorKind::WorkerFailed,
                &format!("worker exited before answering batch {}", batch.index),
            ));
        }
        let reply: BatchReply = serde_json::from_str(&line)?;
        if reply.index != batch.index {
            return Err(Error::new(
                ErrorKind::WorkerFailed,
                &format!(
                    "worker answered batch {} when asked for batch {}",
                    reply.index, batch.index
                ),
            ));
        }

        total += reply.total;
        shared.answered.fetch_add(1, Ordering::SeqCst);
    }
}

/// Worker side of the process pool: answer every [`BatchRequest`] line on
/// `input` with a [`BatchReply`] line on `output` until `input` closes.
/// Returns the number of batches served.
///
/// # Example
///
/// ```rust
/// # use ntsim::aggregate::serve;
/// use ntsim::experiment::Coprime;
/// use num::BigUint;
///
/// let input = "{\"index\":0,\"len\":10}\n{\"index\":1,\"len\":5}\n";
/// let mut output = Vec::new();
///
/// let served = serve(&Coprime, &BigUint::from(1_u32), 3, input.as_bytes(), &mut output).unwrap();
///
/// assert_eq!(served, 2);
/// assert_eq!(
///     String::from_utf8(output).unwrap(),
///     "{\"index\":0,\"total\":10}\n{\"index\":1,\"total\":5}\n"
/// );
/// ```
pub fn serve<E, R, W>(exp: &E, n: &BigUint, seed: u64, input: R, mut output: W) -> Result<u64>
where
    E: Experiment,
    R: BufRead,
    W: Write,
{
    let u = UniformInt::new(n.clone())?;
    let mut served = 0;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let req: BatchRequest = serde_json::from_str(&line)?;
        let total = exp.run_batch(&u, req.len, &mut batch_rng(seed, req.index));
        tracing::trace!(index = req.index, len = req.len, total, "served batch");

        serde_json::to_writer(&mut output, &BatchReply {
            index: req.index,
            total,
        })?;
        output.write_all(b"\n")?;
        output.flush()?;
        served += 1;
    }
    Ok(served)
}
