//! Prime factorization by trial division and Pollard-Brent rho
use super::primality::{is_prime, small_primes};
use itertools::Itertools;
use num::{BigUint, Integer};
use num_traits::{One, Zero};
use std::collections::BTreeMap;
use std::fmt;

// Products of differences accumulated between gcd evaluations
const RHO_BATCH: u64 = 128;

/// Prime-power decomposition of a positive integer, ordered by prime
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Factorization(BTreeMap<BigUint, u32>);

impl Factorization {
    /// Number of distinct prime factors
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` for the factorization of 1
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Exponent of `p`, zero if `p` does not divide the number
    pub fn exponent(&self, p: &BigUint) -> u32 {
        self.0.get(p).copied().unwrap_or(0)
    }

    /// `(prime, exponent)` pairs in increasing prime order
    pub fn iter(&self) -> impl Iterator<Item = (&BigUint, u32)> {
        self.0.iter().map(|(p, &e)| (p, e))
    }

    /// Whether every exponent is 1
    pub fn is_square_free(&self) -> bool {
        self.0.values().all(|&e| e == 1)
    }

    /// Multiply the factorization back out
    pub fn product(&self) -> BigUint {
        self.iter()
            .fold(BigUint::one(), |acc, (p, e)| acc * p.pow(e))
    }

    fn add(&mut self, p: BigUint, e: u32) {
        *self.0.entry(p).or_insert(0) += e;
    }
}

impl fmt::Display for Factorization {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "1");
        }
        let terms = self.iter().map(|(p, e)| {
            if e == 1 {
                p.to_string()
            } else {
                format!("{}^{}", p, e)
            }
        });
        write!(f, "{}", terms.format(" * "))
    }
}

/// Factor `m` into primes
///
/// # Example
///
/// ```rust
/// # use ntsim::arith::factorize;
/// use num::BigUint;
///
/// let fs = factorize(&BigUint::from(360_u32));
/// assert_eq!(fs.to_string(), "2^3 * 3^2 * 5");
/// assert!(!fs.is_square_free());
/// ```
///
/// # Panics
///
/// Panics if `m` is zero.
pub fn factorize(m: &BigUint) -> Factorization {
    assert!(!m.is_zero(), "zero has no prime factorization");
    let mut factors = Factorization::default();
    let rest = strip_small_primes(m, &mut factors);
    if !rest.is_one() {
        split_into(rest, 1, &mut factors);
    }
    factors
}

/// Whether no prime divides `m` more than once
///
/// Small primes are divided out first and the function returns as soon as
/// one of them repeats. The cofactor is then settled by a primality test, a
/// perfect-square test, and only if both are inconclusive, a full
/// factorization.
///
/// # Example
///
/// ```rust
/// # use ntsim::arith::is_square_free;
/// use num::BigUint;
///
/// assert!(is_square_free(&BigUint::from(1_u32)));
/// assert!(is_square_free(&BigUint::from(6_u32)));
/// assert!(!is_square_free(&BigUint::from(4_u32)));
/// ```
///
/// # Panics
///
/// Panics if `m` is zero.
pub fn is_square_free(m: &BigUint) -> bool {
    assert!(!m.is_zero(), "zero has no prime factorization");
    let mut rest = m.clone();
    for &p in small_primes() {
        if (&rest % p).is_zero() {
            rest /= p;
            if (&rest % p).is_zero() {
                return false;
            }
        }
        if rest.is_one() {
            return true;
        }
    }

    if is_prime(&rest) {
        return true;
    }
    if is_perfect_square(&rest) {
        return false;
    }

    let mut factors = Factorization::default();
    split_into(rest, 1, &mut factors);
    factors.is_square_free()
}

fn strip_small_primes(m: &BigUint, factors: &mut Factorization) -> BigUint {
    let mut rest = m.clone();
    for &p in small_primes() {
        let mut e = 0;
        while (&rest % p).is_zero() {
            rest /= p;
            e += 1;
        }
        if e > 0 {
            factors.add(BigUint::from(p), e);
        }
        if rest.is_one() {
            break;
        }
    }
    rest
}

fn is_perfect_square(n: &BigUint) -> bool {
    let r = n.sqrt();
    &r * &r == *n
}

// `n` has no prime factor below the trial division bound and is not one.
fn split_into(n: BigUint, multiplicity: u32, factors: &mut Factorization) {
    if is_prime(&n) {
        factors.add(n, multiplicity);
        return;
    }

    let r = n.sqrt();
    if &r * &r == n {
        split_into(r, 2 * multiplicity, factors);
        return;
    }

    let d = pollard_brent(&n);
    let q = &n / &d;
    split_into(d, multiplicity, factors);
    split_into(q, multiplicity, factors);
}

/// A non-trivial divisor of the odd composite `n`.
fn pollard_brent(n: &BigUint) -> BigUint {
    let one = BigUint::one();
    let mut c = BigUint::one();
    loop {
        let step = |x: &BigUint| (x * x + &c) % n;

        let mut y = BigUint::from(2_u32);
        let mut x = y.clone();
        let mut ys = y.clone();
        let mut g = one.clone();
        let mut q = one.clone();
        let mut r: u64 = 1;

        while g.is_one() {
            x = y.clone();
            for _ in 0..r {
                y = step(&y);
            }
            let mut k = 0;
            while k < r && g.is_one() {
                ys = y.clone();
                for _ in 0..RHO_BATCH.min(r - k) {
                    y = step(&y);
                    q = q * abs_diff(&x, &y) % n;
                }
                g = q.gcd(n);
                k += RHO_BATCH;
            }
            r *= 2;
        }

        if g == *n {
            // the batched product overshot, so retrace one step at a time
            loop {
                ys = step(&ys);
                g = abs_diff(&x, &ys).gcd(n);
                if !g.is_one() {
                    break;
                }
            }
        }

        if g != *n {
            return g;
        }
        c += 1_u32;
    }
}

#[inline]
fn abs_diff(a: &BigUint, b: &BigUint) -> BigUint {
    if a > b {
        a - b
    } else {
        b - a
    }
}
