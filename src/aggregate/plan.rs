use crate::result::{Error, ErrorKind, Result};
use serde::{Deserialize, Serialize};

/// A contiguous run of trials evaluated by one worker with one random stream
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Batch {
    /// Position in the plan, also selects the batch's random stream
    pub index: u64,
    /// Number of trials
    pub len: u64,
}

/// Split of `trials` into full batches of `batch_size` followed by one
/// shorter remainder batch when `batch_size` does not divide `trials`.
///
/// # Example
///
/// ```rust
/// # use ntsim::aggregate::BatchPlan;
/// let plan = BatchPlan::new(1_050, 100).unwrap();
///
/// assert_eq!(plan.len(), 11);
/// assert_eq!(plan.batch(10).len, 50);
/// assert_eq!(plan.iter().map(|b| b.len).sum::<u64>(), 1_050);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchPlan {
    trials: u64,
    batch_size: u64,
}

impl BatchPlan {
    pub fn new(trials: u64, batch_size: u64) -> Result<Self> {
        if trials == 0 {
            Err(Error::new(ErrorKind::NoTrials, "cannot estimate from zero trials"))
        } else if batch_size == 0 {
            Err(Error::new(ErrorKind::InvalidParameter, "batch size must be positive"))
        } else {
            Ok(BatchPlan { trials, batch_size })
        }
    }

    #[inline]
    pub fn trials(&self) -> u64 {
        self.trials
    }

    #[inline]
    pub fn batch_size(&self) -> u64 {
        self.batch_size
    }

    /// Number of batches of exactly `batch_size` trials
    #[inline]
    pub fn n_full(&self) -> u64 {
        self.trials / self.batch_size
    }

    /// Length of the trailing short batch, zero if there is none
    #[inline]
    pub fn remainder(&self) -> u64 {
        self.trials % self.batch_size
    }

    /// Total number of batches
    #[inline]
    pub fn len(&self) -> u64 {
        self.n_full() + u64::from(self.remainder() > 0)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `index`th batch
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn batch(&self, index: u64) -> Batch {
        assert!(index < self.len(), "batch {index} out of range");
        let len = if index < self.n_full() {
            self.batch_size
        } else {
            self.remainder()
        };
        Batch { index, len }
    }

    pub fn iter(&self) -> impl Iterator<Item = Batch> + '_ {
        (0..self.len()).map(move |ix| self.batch(ix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_trials_is_an_explicit_error() {
        let err = BatchPlan::new(0, 100).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoTrials);
    }

    #[test]
    fn zero_batch_size_is_invalid() {
        let err = BatchPlan::new(10, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn even_split_has_no_remainder_batch() {
        let plan = BatchPlan::new(1_000, 100).unwrap();
        assert_eq!(plan.len(), 10);
        assert_eq!(plan.remainder(), 0);
        assert!(plan.iter().all(|b| b.len == 100));
    }

    #[test]
    fn fewer_trials_than_batch_size() {
        let plan = BatchPlan::new(7, 100).unwrap();
        assert_eq!(plan.iter().collect::<Vec<_>>(), vec![Batch { index: 0, len: 7 }]);
    }

    #[test]
    #[should_panic]
    fn batch_out_of_range_panics() {
        BatchPlan::new(10, 5).unwrap().batch(2);
    }

    proptest! {
        #[test]
        fn batches_cover_trials_exactly_once(trials in 1_u64..100_000, batch_size in 1_u64..5_000) {
            let plan = BatchPlan::new(trials, batch_size).unwrap();
            let batches: Vec<Batch> = plan.iter().collect();

            prop_assert_eq!(batches.iter().map(|b| b.len).sum::<u64>(), trials);
            prop_assert!(batches.iter().all(|b| b.len > 0));
            for (i, b) in batches.iter().enumerate() {
                prop_assert_eq!(b.index, i as u64);
                if i + 1 < batches.len() {
                    prop_assert_eq!(b.len, batch_size);
                } else {
                    prop_assert!(b.len <= batch_size);
                }
            }
        }
    }
}
