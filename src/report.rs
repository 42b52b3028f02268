//! Console output of comparisons
use crate::sweep::{Comparison, ResultSeries};
use std::io::{self, Write};

/// Write one comparison block with `precision` decimal places
///
/// # Example
///
/// ```rust
/// # use ntsim::report::write_comparison;
/// # use ntsim::sweep::Comparison;
/// use num::BigUint;
/// use std::time::Duration;
///
/// let c = Comparison {
///     n: BigUint::from(10_u32),
///     offset: 0,
///     empirical: 0.6321,
///     theoretical: 0.607927101854,
///     seed: 1,
///     elapsed: Duration::from_millis(1500),
/// };
///
/// let mut out = Vec::new();
/// write_comparison(&mut out, &c, 6).unwrap();
/// let text = String::from_utf8(out).unwrap();
///
/// assert!(text.starts_with("N = 10:\n"));
/// assert!(text.contains("  theoretical: 0.607927\n"));
/// assert!(text.contains("  difference:  0.024173\n"));
/// ```
pub fn write_comparison<W: Write>(w: &mut W, c: &Comparison, precision: usize) -> io::Result<()> {
    writeln!(w, "N = {}:", c.n)?;
    writeln!(w, "  empirical:   {:.*}", precision, c.empirical)?;
    writeln!(w, "  theoretical: {:.*}", precision, c.theoretical)?;
    writeln!(w, "  difference:  {:.*}", precision, c.difference())?;
    writeln!(w, "  elapsed:     {:.3}s", c.elapsed.as_secs_f64())?;
    writeln!(w)
}

/// Write every comparison followed by a one-line summary
pub fn write_series<W: Write>(w: &mut W, series: &ResultSeries) -> io::Result<()> {
    let precision = series.experiment.precision();
    for c in &series.points {
        write_comparison(w, c, precision)?;
    }
    write_summary(w, series)
}

/// Mean absolute difference and total time of a series
pub fn write_summary<W: Write>(w: &mut W, series: &ResultSeries) -> io::Result<()> {
    match series.mean_difference() {
        Some(d) => writeln!(
            w,
            "{}: {} values of N, mean difference {:.*}, total {:.3}s",
            series.experiment,
            series.len(),
            series.experiment.precision(),
            d,
            series.elapsed().as_secs_f64()
        ),
        None => writeln!(w, "{}: no values of N", series.experiment),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::ExperimentKind;
    use indoc::indoc;
    use num::BigUint;
    use std::time::Duration;

    fn series() -> ResultSeries {
        let n = BigUint::from(10_u32).pow(100);
        ResultSeries {
            experiment: ExperimentKind::DivisionCount,
            base: n.clone(),
            points: vec![Comparison {
                n: &n + 1_u32,
                offset: 1,
                empirical: 193.5,
                theoretical: 194.054_022_878,
                seed: 4,
                elapsed: Duration::from_millis(250),
            }],
        }
    }

    #[test]
    fn division_count_uses_four_places() {
        let mut out = Vec::new();
        write_series(&mut out, &series()).unwrap();
        let expected = indoc! {"
            N = 10000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000001:
              empirical:   193.5000
              theoretical: 194.0540
              difference:  0.5540
              elapsed:     0.250s

            division-count: 1 values of N, mean difference 0.5540, total 0.250s
        "};
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn empty_series_summary() {
        let empty = ResultSeries {
            points: vec![],
            ..series()
        };
        let mut out = Vec::new();
        write_series(&mut out, &empty).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "division-count: no values of N\n");
    }
}
