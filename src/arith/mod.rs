//! Number theory on arbitrary precision integers
mod euclid;
mod factor;
mod primality;

pub use euclid::*;
pub use factor::*;
pub use primality::*;

use crate::consts::LN_2;
use num::BigUint;
use num_traits::ToPrimitive;

/// Natural logarithm of an arbitrary precision integer
///
/// Values wider than 64 bits are reduced to their top 64 bits first, so the
/// result keeps full `f64` relative precision however large `n` is.
///
/// # Example
///
/// ```rust
/// # use ntsim::arith::ln;
/// use num::BigUint;
///
/// let n = BigUint::from(10_u32).pow(100);
/// assert!((ln(&n) - 100.0 * 10_f64.ln()).abs() < 1E-10);
/// ```
pub fn ln(n: &BigUint) -> f64 {
    let bits = n.bits();
    if bits <= 64 {
        return n.to_u64().map_or(f64::NAN, |x| (x as f64).ln());
    }
    let shift = bits - 64;
    let top = (n >> shift).to_u64().map_or(f64::NAN, |x| x as f64);
    top.ln() + shift as f64 * LN_2
}
