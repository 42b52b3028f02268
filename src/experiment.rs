//! The four Monte Carlo experiments and the trait they share
use crate::arith::{division_count, is_coprime, is_square_free, ln, remainder_below_half};
use crate::cache::ShardedLru;
use crate::consts::{EUCLID_STEP_COEFF, REMAINDER_BELOW_HALF, SIX_OVER_PI_SQUARED};
use crate::result::{Error, ErrorKind, Result};
use crate::sampler::UniformInt;
use num::BigUint;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A quantity estimated by averaging independent random trials.
pub trait Experiment: Sync {
    /// Which experiment this is
    fn kind(&self) -> ExperimentKind;

    /// Value contributed by one trial. Predicates return 0 or 1.
    fn trial<R: Rng + ?Sized>(&self, u: &UniformInt, rng: &mut R) -> u64;

    /// The closed-form value the empirical mean approaches
    fn theoretical(&self, n: &BigUint) -> f64;

    /// Sum of `len` trials drawn from `rng`
    fn run_batch<R: Rng + ?Sized>(&self, u: &UniformInt, len: u64, rng: &mut R) -> u64 {
        (0..len).map(|_| self.trial(u, rng)).sum()
    }
}

/// Identifies an experiment on the command line and across processes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExperimentKind {
    /// Mean number of Euclidean remainder steps on a random pair
    DivisionCount,
    /// Probability that a random pair is coprime
    Coprime,
    /// Probability that N mod m < m / 2 for a random divisor m
    Remainder,
    /// Probability that a random integer is square-free
    SquareFree,
}

impl ExperimentKind {
    pub const ALL: [ExperimentKind; 4] = [
        ExperimentKind::DivisionCount,
        ExperimentKind::Coprime,
        ExperimentKind::Remainder,
        ExperimentKind::SquareFree,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExperimentKind::DivisionCount => "division-count",
            ExperimentKind::Coprime => "coprime",
            ExperimentKind::Remainder => "remainder",
            ExperimentKind::SquareFree => "square-free",
        }
    }

    /// Decimal places used when reporting values
    pub fn precision(&self) -> usize {
        match self {
            ExperimentKind::DivisionCount => 4,
            _ => 6,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ExperimentKind::DivisionCount => {
                "Mean number of divisions in the Euclidean algorithm"
            }
            ExperimentKind::Coprime => "Probability that two integers are coprime",
            ExperimentKind::Remainder => "Probability that N mod m < m / 2",
            ExperimentKind::SquareFree => "Probability that an integer is square-free",
        }
    }

    pub fn y_desc(&self) -> &'static str {
        match self {
            ExperimentKind::DivisionCount => "mean number of divisions",
            ExperimentKind::Coprime => "P(gcd(a, b) = 1)",
            ExperimentKind::Remainder => "P(r < m / 2)",
            ExperimentKind::SquareFree => "P(m square-free)",
        }
    }

    pub fn theory_desc(&self) -> &'static str {
        match self {
            ExperimentKind::DivisionCount => "theoretical (12 ln 2 / π²) ln N",
            ExperimentKind::Coprime | ExperimentKind::SquareFree => {
                "theoretical 6 / π²"
            }
            ExperimentKind::Remainder => "theoretical 2 − 2 ln 2",
        }
    }
}

impl fmt::Display for ExperimentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExperimentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ExperimentKind::ALL
            .iter()
            .find(|k| k.as_str() == s)
            .copied()
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidParameter,
                    &format!("unknown experiment '{s}'"),
                )
            })
    }
}

/// Steps taken by the Euclidean algorithm on a pair drawn from [1, N]²
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DivisionCount;

impl Experiment for DivisionCount {
    fn kind(&self) -> ExperimentKind {
        ExperimentKind::DivisionCount
    }

    fn trial<R: Rng + ?Sized>(&self, u: &UniformInt, rng: &mut R) -> u64 {
        let a = u.draw(rng);
        let b = u.draw(rng);
        division_count(&a, &b)
    }

    fn theoretical(&self, n: &BigUint) -> f64 {
        EUCLID_STEP_COEFF * ln(n)
    }
}

/// Whether a pair drawn from [1, N]² is coprime
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Coprime;

impl Experiment for Coprime {
    fn kind(&self) -> ExperimentKind {
        ExperimentKind::Coprime
    }

    fn trial<R: Rng + ?Sized>(&self, u: &UniformInt, rng: &mut R) -> u64 {
        let a = u.draw(rng);
        let b = u.draw(rng);
        u64::from(is_coprime(&a, &b))
    }

    // The O(ln N / N) correction is dropped
    fn theoretical(&self, _n: &BigUint) -> f64 {
        SIX_OVER_PI_SQUARED
    }
}

/// Whether N mod m < m / 2 for m drawn from [1, N]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RemainderBelowHalf;

impl Experiment for RemainderBelowHalf {
    fn kind(&self) -> ExperimentKind {
        ExperimentKind::Remainder
    }

    fn trial<R: Rng + ?Sized>(&self, u: &UniformInt, rng: &mut R) -> u64 {
        let m = u.draw(rng);
        u64::from(remainder_below_half(u.n(), &m))
    }

    fn theoretical(&self, _n: &BigUint) -> f64 {
        REMAINDER_BELOW_HALF
    }
}

/// Whether m drawn from [1, N] is square-free, memoized in an LRU cache
#[derive(Debug)]
pub struct SquareFree {
    cache: Option<ShardedLru<BigUint, bool>>,
}

impl SquareFree {
    /// Square-free experiment remembering up to `capacity` results
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(SquareFree {
            cache: Some(ShardedLru::new(capacity)?),
        })
    }

    /// Square-free experiment that factors every sample
    pub fn uncached() -> Self {
        SquareFree { cache: None }
    }

    pub fn cache(&self) -> Option<&ShardedLru<BigUint, bool>> {
        self.cache.as_ref()
    }

    /// Memoized square-freeness test
    pub fn check(&self, m: BigUint) -> bool {
        tracing::trace!(%m, "square-free check");
        match &self.cache {
            Some(cache) => cache.get_or_insert_with(m, is_square_free),
            None => is_square_free(&m),
        }
    }
}

impl Experiment for SquareFree {
    fn kind(&self) -> ExperimentKind {
        ExperimentKind::SquareFree
    }

    fn trial<R: Rng + ?Sized>(&self, u: &UniformInt, rng: &mut R) -> u64 {
        u64::from(self.check(u.draw(rng)))
    }

    fn theoretical(&self, _n: &BigUint) -> f64 {
        SIX_OVER_PI_SQUARED
    }
}

/// Any one of the experiments, chosen at run time
#[derive(Debug)]
pub enum AnyExperiment {
    DivisionCount(DivisionCount),
    Coprime(Coprime),
    Remainder(RemainderBelowHalf),
    SquareFree(SquareFree),
}

impl AnyExperiment {
    /// Build the experiment `kind`. `cache_capacity` is only used by the
    /// square-free experiment; zero disables its cache.
    pub fn new(kind: ExperimentKind, cache_capacity: usize) -> Result<Self> {
        let exp = match kind {
            ExperimentKind::DivisionCount => AnyExperiment::DivisionCount(DivisionCount),
            ExperimentKind::Coprime => AnyExperiment::Coprime(Coprime),
            ExperimentKind::Remainder => AnyExperiment::Remainder(RemainderBelowHalf),
            ExperimentKind::SquareFree if cache_capacity == 0 => {
                AnyExperiment::SquareFree(SquareFree::uncached())
            }
            ExperimentKind::SquareFree => {
                AnyExperiment::SquareFree(SquareFree::new(cache_capacity)?)
            }
        };
        Ok(exp)
    }
}

impl Experiment for AnyExperiment {
    fn kind(&self) -> ExperimentKind {
        match self {
            AnyExperiment::DivisionCount(e) => e.kind(),
            AnyExperiment::Coprime(e) => e.kind(),
            AnyExperiment::Remainder(e) => e.kind(),
            AnyExperiment::SquareFree(e) => e.kind(),
        }
    }

    fn trial<R: Rng + ?Sized>(&self, u: &UniformInt, rng: &mut R) -> u64 {
        match self {
            AnyExperiment::DivisionCount(e) => e.trial(u, rng),
            AnyExperiment::Coprime(e) => e.trial(u, rng),
            AnyExperiment::Remainder(e) => e.trial(u, rng),
            AnyExperiment::SquareFree(e) => e.trial(u, rng),
        }
    }

    fn theoretical(&self, n: &BigUint) -> f64 {
        match self {
            AnyExperiment::DivisionCount(e) => e.theoretical(n),
            AnyExperiment::Coprime(e) => e.theoretical(n),
            AnyExperiment::Remainder(e) => e.theoretical(n),
            AnyExperiment::SquareFree(e) => e.theoretical(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::batch_rng;
    use num_traits::One;

    const TOL: f64 = 1E-12;

    fn sampler(n: u64) -> UniformInt {
        UniformInt::new(BigUint::from(n)).unwrap()
    }

    #[test]
    fn kind_round_trips_through_str() {
        for kind in ExperimentKind::ALL {
            assert_eq!(kind.as_str().parse::<ExperimentKind>().unwrap(), kind);
        }
        let err = "pi".parse::<ExperimentKind>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn kind_serializes_as_kebab_case() {
        let s = serde_json::to_string(&ExperimentKind::SquareFree).unwrap();
        assert_eq!(s, "\"square-free\"");
    }

    #[test]
    fn precision_per_experiment() {
        assert_eq!(ExperimentKind::DivisionCount.precision(), 4);
        assert_eq!(ExperimentKind::Coprime.precision(), 6);
        assert_eq!(ExperimentKind::Remainder.precision(), 6);
        assert_eq!(ExperimentKind::SquareFree.precision(), 6);
    }

    #[test]
    fn theoretical_values() {
        let n = BigUint::from(10_u32).pow(100);
        assert::close(Coprime.theoretical(&n), 0.607_927_101_854_026_6, TOL);
        assert::close(SquareFree::uncached().theoretical(&n), 0.607_927_101_854_026_6, TOL);
        assert::close(RemainderBelowHalf.theoretical(&n), 0.613_705_638_880_109_4, TOL);
        // (12 ln 2 / π²) * 100 ln 10
        assert::close(DivisionCount.theoretical(&n), 194.054_022_878_406_8, 1E-9);
    }

    #[test]
    fn remainder_with_n_of_one_always_succeeds() {
        let u = sampler(1);
        let mut rng = batch_rng(3, 0);
        assert_eq!(RemainderBelowHalf.run_batch(&u, 50, &mut rng), 50);
    }

    #[test]
    fn coprime_with_n_of_one_always_succeeds() {
        let u = sampler(1);
        let mut rng = batch_rng(3, 0);
        assert_eq!(Coprime.run_batch(&u, 50, &mut rng), 50);
    }

    #[test]
    fn division_count_with_n_of_one_is_one_step() {
        let u = sampler(1);
        let mut rng = batch_rng(3, 0);
        assert_eq!(DivisionCount.run_batch(&u, 20, &mut rng), 20);
    }

    #[test]
    fn square_free_cache_is_consulted() {
        let exp = SquareFree::new(100).unwrap();
        let u = sampler(10);
        let mut rng = batch_rng(5, 0);
        let total = exp.run_batch(&u, 200, &mut rng);
        assert!(total <= 200);

        let cache = exp.cache().unwrap();
        // only ten distinct values can be drawn
        assert!(cache.misses() <= 10);
        assert_eq!(cache.hits() + cache.misses(), 200);
    }

    #[test]
    fn cached_and_uncached_agree() {
        let cached = SquareFree::new(16).unwrap();
        let uncached = SquareFree::uncached();
        let u = sampler(1_000);
        let a = cached.run_batch(&u, 300, &mut batch_rng(11, 1));
        let b = uncached.run_batch(&u, 300, &mut batch_rng(11, 1));
        assert_eq!(a, b);
        assert!(cached.check(BigUint::one()));
    }

    #[test]
    fn any_experiment_delegates() {
        for kind in ExperimentKind::ALL {
            let exp = AnyExperiment::new(kind, 10).unwrap();
            assert_eq!(exp.kind(), kind);
        }
        match AnyExperiment::new(ExperimentKind::SquareFree, 0).unwrap() {
            AnyExperiment::SquareFree(sf) => assert!(sf.cache().is_none()),
            other => panic!("unexpected {other:?}"),
        }
    }
}
