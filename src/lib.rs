//! Monte Carlo estimates of classical number-theoretic constants.
//!
//! Each experiment draws uniform integers from `[1, N]`, evaluates a
//! predicate (or a step count) on them, and compares the empirical average
//! against the closed-form limit:
//!
//! | Experiment        | Limit                       |
//! |-------------------|-----------------------------|
//! | Euclid divisions  | (12 ln 2 / π²) ln N         |
//! | Coprime pairs     | 6 / π²                      |
//! | r < m / 2         | 2 − 2 ln 2                  |
//! | Square-free       | 6 / π²                      |
//!
//! # Example
//!
//! ```rust
//! use ntsim::prelude::*;
//! use num::BigUint;
//!
//! let n = BigUint::from(1_000_000_u32);
//! let est = estimate(&Coprime, &n, 2_000, &Strategy::sequential(), Some(7)).unwrap();
//!
//! assert!((est.mean() - Coprime.theoretical(&n)).abs() < 0.05);
//! ```
#[cfg(doctest)]
doc_comment::doctest!("../README.md");

pub mod aggregate;
pub mod arith;
pub mod cache;
pub mod config;
pub mod consts;
pub mod experiment;
pub mod plot;
pub mod prelude;
pub mod report;
pub mod result;
pub mod sampler;
pub mod sweep;
