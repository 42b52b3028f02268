//! Empirical versus theoretical values over a range of N
use crate::aggregate::estimate;
use crate::config::SweepConfig;
use crate::experiment::{Experiment, ExperimentKind};
use crate::result::{Error, ErrorKind, Result};
use num::BigUint;
use std::time::Duration;

/// Empirical and theoretical value at one N
#[derive(Clone, Debug, PartialEq)]
pub struct Comparison {
    pub n: BigUint,
    /// Position of `n` within the sweep, `n - base`
    pub offset: u64,
    pub empirical: f64,
    pub theoretical: f64,
    /// Master seed used for this N
    pub seed: u64,
    pub elapsed: Duration,
}

impl Comparison {
    /// |empirical - theoretical|
    pub fn difference(&self) -> f64 {
        (self.empirical - self.theoretical).abs()
    }
}

/// Comparisons for every N of a sweep, in sweep order
#[derive(Clone, Debug, PartialEq)]
pub struct ResultSeries {
    pub experiment: ExperimentKind,
    pub base: BigUint,
    pub points: Vec<Comparison>,
}

impl ResultSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Mean of the absolute differences, `None` for an empty series
    pub fn mean_difference(&self) -> Option<f64> {
        if self.points.is_empty() {
            None
        } else {
            let sum: f64 = self.points.iter().map(Comparison::difference).sum();
            Some(sum / self.points.len() as f64)
        }
    }

    /// Total time spent estimating
    pub fn elapsed(&self) -> Duration {
        self.points.iter().map(|c| c.elapsed).sum()
    }
}

/// Run `exp` at every N of `config`
pub fn sweep<E: Experiment>(exp: &E, config: &SweepConfig) -> Result<ResultSeries> {
    sweep_with(exp, config, |_| {})
}

/// Run `exp` at every N of `config`, calling `on_point` as soon as each
/// comparison is available
pub fn sweep_with<E, F>(exp: &E, config: &SweepConfig, mut on_point: F) -> Result<ResultSeries>
where
    E: Experiment,
    F: FnMut(&Comparison),
{
    config.validate()?;
    if exp.kind() != config.experiment {
        return Err(Error::new(
            ErrorKind::InvalidParameter,
            &format!(
                "configured for {} but asked to run {}",
                config.experiment,
                exp.kind()
            ),
        ));
    }

    let mut points = Vec::with_capacity(config.count as usize);
    for (k, n) in config.ns().enumerate() {
        let k = k as u64;
        let est = estimate(exp, &n, config.trials, &config.strategy, config.seed_for(k))?;
        let point = Comparison {
            theoretical: exp.theoretical(&n),
            empirical: est.mean(),
            offset: k * config.step,
            seed: est.seed,
            elapsed: est.elapsed,
            n,
        };

        tracing::info!(
            experiment = %config.experiment,
            offset = point.offset,
            empirical = point.empirical,
            theoretical = point.theoretical,
            elapsed_ms = point.elapsed.as_millis() as u64,
            "sweep point"
        );
        on_point(&point);
        points.push(point);
    }

    Ok(ResultSeries {
        experiment: config.experiment,
        base: config.base.clone(),
        points,
    })
}
