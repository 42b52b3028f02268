//! Re-imports for convenience
#[doc(no_inline)]
pub use crate::aggregate::{estimate, Estimate, ProcessPool, Strategy};
#[doc(no_inline)]
pub use crate::config::SweepConfig;
#[doc(no_inline)]
pub use crate::experiment::*;
#[doc(no_inline)]
pub use crate::result::{Error, ErrorKind};
#[doc(no_inline)]
pub use crate::sampler::UniformInt;
#[doc(no_inline)]
pub use crate::sweep::{sweep, sweep_with, Comparison, ResultSeries};
