//! Uniform integer sampling on [1, N] and per-batch random streams
use crate::result::{Error, ErrorKind, Result};
use num::bigint::RandBigInt;
use num::BigUint;
use num_traits::{One, Zero};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::fmt;

/// Random number generator used for every batch of trials
pub type BatchRng = Xoshiro256PlusPlus;

/// Discrete uniform distribution over the closed range [1, N]
///
/// # Example
///
/// ```rust
/// # use ntsim::sampler::UniformInt;
/// use num::BigUint;
///
/// let u = UniformInt::new(BigUint::from(6_u32)).unwrap();
/// let mut rng = rand::thread_rng();
///
/// let x = u.draw(&mut rng);
/// assert!(x >= BigUint::from(1_u32) && x <= BigUint::from(6_u32));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformInt {
    n: BigUint,
    // exclusive upper bound, n + 1
    upper: BigUint,
}

impl UniformInt {
    /// Create a sampler over [1, n]. Fails if `n` is zero.
    pub fn new(n: BigUint) -> Result<Self> {
        if n.is_zero() {
            Err(Error::new(
                ErrorKind::InvalidParameter,
                "N must be at least 1",
            ))
        } else {
            Ok(Self::new_unchecked(n))
        }
    }

    /// Creates a new UniformInt without checking whether `n` is valid.
    #[inline]
    pub fn new_unchecked(n: BigUint) -> Self {
        let upper = &n + 1_u32;
        UniformInt { n, upper }
    }

    /// Get the upper bound, N
    #[inline]
    pub fn n(&self) -> &BigUint {
        &self.n
    }

    /// Single draw
    #[inline]
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> BigUint {
        rng.gen_biguint_range(&BigUint::one(), &self.upper)
    }

    /// Multiple draws
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<BigUint> {
        (0..n).map(|_| self.draw(rng)).collect()
    }
}

impl fmt::Display for UniformInt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "UniformInt(1, {})", self.n)
    }
}

/// The random stream of batch `index` under `seed`.
///
/// The stream depends only on `(seed, index)`, never on the thread or
/// process that evaluates the batch.
pub fn batch_rng(seed: u64, index: u64) -> BatchRng {
    BatchRng::seed_from_u64(seed ^ index.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Use `seed` if given, otherwise draw one from process entropy.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| rand::thread_rng().gen())
}
