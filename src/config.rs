//! Run configuration with the defaults of each experiment
use crate::aggregate::{ProcessPool, Strategy, DEFAULT_BATCH_SIZE};
use crate::cache::DEFAULT_CAPACITY;
use crate::experiment::ExperimentKind;
use crate::result::{Error, ErrorKind, Result};
use num::BigUint;

/// Parse a non-negative integer written either in decimal digits or as
/// a power `b^e`, with `_` allowed as a separator: `1_000`, `10^100`.
///
/// # Example
///
/// ```rust
/// # use ntsim::config::parse_biguint;
/// use num::BigUint;
///
/// assert_eq!(parse_biguint("10^3").unwrap(), BigUint::from(1_000_u32));
/// assert_eq!(parse_biguint("1_024").unwrap(), BigUint::from(1_024_u32));
/// assert!(parse_biguint("ten").is_err());
/// ```
pub fn parse_biguint(s: &str) -> Result<BigUint> {
    let s: String = s.trim().chars().filter(|&c| c != '_').collect();
    let invalid = || Error::new(ErrorKind::InvalidParameter, &format!("not an integer: '{s}'"));
    match s.split_once('^') {
        Some((b, e)) => {
            let b: BigUint = b.parse().map_err(|_| invalid())?;
            let e: u32 = e.parse().map_err(|_| invalid())?;
            Ok(b.pow(e))
        }
        None => s.parse().map_err(|_| invalid()),
    }
}

/// Worker count used by the parallel strategies when none is given
pub const DEFAULT_WORKERS: usize = 8;

/// Everything needed to sweep one experiment over a range of N
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SweepConfig {
    pub experiment: ExperimentKind,
    /// First N of the sweep
    pub base: BigUint,
    /// Number of N values
    pub count: u64,
    /// Distance between consecutive N values
    pub step: u64,
    /// Trials per N
    pub trials: u64,
    pub strategy: Strategy,
    /// Master seed; each N derives its own seed from it
    pub seed: Option<u64>,
    /// Square-free memo size, zero disables it
    pub cache_capacity: usize,
}

impl SweepConfig {
    /// Defaults for `kind`.
    ///
    /// The cheap experiments sweep 101 consecutive N from 10^100 with 10^4
    /// sequential trials each. Square-freeness needs factorization, so it
    /// sweeps 11 values ten apart from 10^18 with 10^3 trials on a thread
    /// pool.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use ntsim::config::SweepConfig;
    /// use ntsim::experiment::ExperimentKind;
    /// use num::BigUint;
    ///
    /// let config = SweepConfig::for_experiment(ExperimentKind::Coprime);
    /// assert_eq!(config.base, BigUint::from(10_u32).pow(100));
    /// assert_eq!(config.ns().count(), 101);
    /// ```
    pub fn for_experiment(kind: ExperimentKind) -> Self {
        match kind {
            ExperimentKind::SquareFree => SweepConfig {
                experiment: kind,
                base: BigUint::from(10_u32).pow(18),
                count: 11,
                step: 10,
                trials: 1_000,
                strategy: Strategy::Threads {
                    workers: DEFAULT_WORKERS,
                    batch_size: DEFAULT_BATCH_SIZE,
                },
                seed: None,
                cache_capacity: DEFAULT_CAPACITY,
            },
            _ => SweepConfig {
                experiment: kind,
                base: BigUint::from(10_u32).pow(100),
                count: 101,
                step: 1,
                trials: 10_000,
                strategy: Strategy::sequential(),
                seed: None,
                cache_capacity: DEFAULT_CAPACITY,
            },
        }
    }

    /// Reject configurations that cannot produce a result
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(Error::new(ErrorKind::InvalidParameter, msg));
        if self.base == BigUint::from(0_u32) {
            return invalid("base N must be at least 1");
        }
        if self.count == 0 {
            return invalid("sweep must contain at least one N");
        }
        if (self.count - 1).checked_mul(self.step).is_none() {
            return invalid("last N of the sweep is too far from the base");
        }
        if self.trials == 0 {
            return Err(Error::new(ErrorKind::NoTrials, "trials must be positive"));
        }
        if self.strategy.batch_size() == 0 {
            return invalid("batch size must be positive");
        }
        match &self.strategy {
            Strategy::Threads { workers: 0, .. } => invalid("worker count must be positive"),
            Strategy::Processes(ProcessPool { workers: 0, .. }) => {
                invalid("worker count must be positive")
            }
            _ => Ok(()),
        }
    }

    /// The swept N values, `base + k * step` for k in `0..count`
    pub fn ns(&self) -> impl Iterator<Item = BigUint> + '_ {
        (0..self.count).map(move |k| &self.base + k * self.step)
    }

    /// Seed for the `k`th N of the sweep
    pub fn seed_for(&self, k: u64) -> Option<u64> {
        self.seed.map(|s| s.wrapping_add(k))
    }
}
