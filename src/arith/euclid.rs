use num::{BigUint, Integer};
use num_traits::{One, Zero};

/// Number of remainder steps the Euclidean algorithm takes on `(a, b)`.
///
/// Each step replaces `(a, b)` with `(b, a mod b)`; counting stops when the
/// remainder reaches zero, so `division_count(a, 0)` is zero.
///
/// # Example
///
/// ```rust
/// # use ntsim::arith::division_count;
/// use num::BigUint;
///
/// // (21, 13) -> (13, 8) -> (8, 5) -> (5, 3) -> (3, 2) -> (2, 1) -> (1, 0)
/// let steps = division_count(&BigUint::from(21_u32), &BigUint::from(13_u32));
/// assert_eq!(steps, 6);
/// ```
pub fn division_count(a: &BigUint, b: &BigUint) -> u64 {
    let mut a = a.clone();
    let mut b = b.clone();
    let mut count = 0;
    while !b.is_zero() {
        let r = &a % &b;
        a = std::mem::replace(&mut b, r);
        count += 1;
    }
    count
}

/// Whether gcd(a, b) = 1
///
/// # Example
///
/// ```rust
/// # use ntsim::arith::is_coprime;
/// use num::BigUint;
///
/// assert!(is_coprime(&BigUint::from(8_u32), &BigUint::from(15_u32)));
/// assert!(!is_coprime(&BigUint::from(6_u32), &BigUint::from(15_u32)));
/// ```
#[inline]
pub fn is_coprime(a: &BigUint, b: &BigUint) -> bool {
    a.gcd(b).is_one()
}

/// Whether `n mod m < m / 2`, compared exactly as `2 (n mod m) < m`.
///
/// # Panics
///
/// Panics if `m` is zero.
#[inline]
pub fn remainder_below_half(n: &BigUint, m: &BigUint) -> bool {
    let r = n % m;
    (r << 1_u32) < *m
}
