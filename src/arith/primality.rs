use num::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use std::sync::OnceLock;

/// Trial division bound used before any modular exponentiation
pub const TRIAL_DIVISION_BOUND: u32 = 1_000;

// The first 13 primes are a deterministic witness set below 3.3e24. Beyond
// that the remaining witnesses keep the error probability below 4^-20.
const WITNESSES: [u32; 20] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71,
];

/// Primes below [`TRIAL_DIVISION_BOUND`], in increasing order
pub fn small_primes() -> &'static [u32] {
    static PRIMES: OnceLock<Vec<u32>> = OnceLock::new();
    PRIMES.get_or_init(|| sieve(TRIAL_DIVISION_BOUND))
}

fn sieve(limit: u32) -> Vec<u32> {
    let limit = limit as usize;
    let mut composite = vec![false; limit];
    let mut primes = Vec::new();
    for i in 2..limit {
        if !composite[i] {
            primes.push(i as u32);
            let mut j = i * i;
            while j < limit {
                composite[j] = true;
                j += i;
            }
        }
    }
    primes
}

/// Miller-Rabin primality test
///
/// # Example
///
/// ```rust
/// # use ntsim::arith::is_prime;
/// use num::BigUint;
///
/// assert!(is_prime(&BigUint::from(1_000_000_007_u64)));
/// assert!(!is_prime(&BigUint::from(561_u32))); // Carmichael number
/// ```
pub fn is_prime(n: &BigUint) -> bool {
    if let Some(small) = n.to_u32() {
        if small < 2 {
            return false;
        }
    }

    for &p in small_primes() {
        if n.to_u32() == Some(p) {
            return true;
        }
        if (n % p).is_zero() {
            return false;
        }
    }

    let bound = u64::from(TRIAL_DIVISION_BOUND);
    if n.to_u64().map_or(false, |x| x < bound * bound) {
        return true;
    }

    let one = BigUint::one();
    let n_minus_one = n - &one;
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    WITNESSES.iter().all(|&a| {
        let mut x = BigUint::from(a).modpow(&d, n);
        if x == one || x == n_minus_one {
            return true;
        }
        for _ in 1..s {
            x = &x * &x % n;
            if x == n_minus_one {
                return true;
            }
        }
        false
    })
}
