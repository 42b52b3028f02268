//! SVG chart of a result series
use crate::result::{Error, ErrorKind, Result};
use crate::sweep::ResultSeries;
use num::BigUint;
use plotters::prelude::*;
use std::fmt::Display;
use std::path::Path;

const SIZE: (u32, u32) = (1000, 600);

fn plot_err<E: Display>(err: E) -> Error {
    Error::new(ErrorKind::Plot, &err.to_string())
}

/// Compact label for the sweep base: `10^k` for powers of ten
pub fn describe(n: &BigUint) -> String {
    let s = n.to_string();
    let (head, tail) = s.split_at(1);
    if s.len() > 4 && head == "1" && tail.bytes().all(|b| b == b'0') {
        format!("10^{}", tail.len())
    } else {
        s
    }
}

/// Draw the empirical series (markers and line) against the theoretical
/// series (dashed line) and write the chart to `path` as SVG.
///
/// The x axis is the offset `N - base`, since the swept N are far beyond
/// what an `f64` axis can tell apart.
pub fn plot_series(series: &ResultSeries, path: &Path) -> Result<()> {
    if series.is_empty() {
        return Err(Error::new(ErrorKind::InvalidParameter, "nothing to plot"));
    }
    let kind = series.experiment;

    let empirical: Vec<(f64, f64)> = series
        .points
        .iter()
        .map(|c| (c.offset as f64, c.empirical))
        .collect();
    let theoretical: Vec<(f64, f64)> = series
        .points
        .iter()
        .map(|c| (c.offset as f64, c.theoretical))
        .collect();

    let (x_min, x_max) = padded_range(empirical.iter().map(|p| p.0), 0.0);
    let (y_min, y_max) = padded_range(
        empirical.iter().chain(theoretical.iter()).map(|p| p.1),
        0.1,
    );

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(kind.title(), ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc(format!("N - {}", describe(&series.base)))
        .y_desc(kind.y_desc())
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(empirical.clone(), &BLUE))
        .map_err(plot_err)?
        .label("empirical")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
    chart
        .draw_series(empirical.iter().map(|&p| Circle::new(p, 3, BLUE.filled())))
        .map_err(plot_err)?;

    chart
        .draw_series(DashedLineSeries::new(
            theoretical,
            10,
            6,
            RED.stroke_width(2),
        ))
        .map_err(plot_err)?
        .label(kind.theory_desc())
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    tracing::debug!(path = %path.display(), "plot written");
    Ok(())
}

// Bounds of `xs` widened by `pad` of their span, never empty
fn padded_range(xs: impl Iterator<Item = f64>, pad: f64) -> (f64, f64) {
    let (lo, hi) = xs.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
        (lo.min(x), hi.max(x))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let span = hi - lo;
    if span <= f64::EPSILON * hi.abs().max(1.0) {
        let half = 0.05 * hi.abs().max(1.0);
        (lo - half, hi + half)
    } else {
        (lo - pad * span, hi + pad * span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::ExperimentKind;
    use crate::sweep::Comparison;
    use std::time::Duration;

    #[test]
    fn describe_powers_of_ten() {
        assert_eq!(describe(&BigUint::from(10_u32).pow(100)), "10^100");
        assert_eq!(describe(&BigUint::from(10_u32).pow(18)), "10^18");
        assert_eq!(describe(&BigUint::from(1000_u32)), "1000");
        assert_eq!(describe(&BigUint::from(12_345_u32)), "12345");
        assert_eq!(describe(&BigUint::from(10_001_u32)), "10001");
    }

    #[test]
    fn padded_range_handles_flat_and_empty_input() {
        assert_eq!(padded_range(std::iter::empty(), 0.1), (0.0, 1.0));
        let (lo, hi) = padded_range([0.6, 0.6].into_iter(), 0.1);
        assert!(lo < 0.6 && hi > 0.6);
        let (lo, hi) = padded_range([0.0, 10.0].into_iter(), 0.1);
        assert::close(lo, -1.0, 1E-12);
        assert::close(hi, 11.0, 1E-12);
    }

    #[test]
    fn writes_an_svg_file() {
        let base = BigUint::from(10_u32).pow(100);
        let points = (0..5_u64)
            .map(|k| Comparison {
                n: &base + k,
                offset: k,
                empirical: 0.6 + 0.002 * k as f64,
                theoretical: 0.607_927,
                seed: k,
                elapsed: Duration::ZERO,
            })
            .collect();
        let series = ResultSeries {
            experiment: ExperimentKind::Coprime,
            base,
            points,
        };

        let path = std::env::temp_dir().join(format!("ntsim-plot-{}.svg", std::process::id()));
        plot_series(&series, &path).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("empirical"));
    }

    #[test]
    fn empty_series_is_rejected() {
        let series = ResultSeries {
            experiment: ExperimentKind::Remainder,
            base: BigUint::from(1_u32),
            points: vec![],
        };
        let err = plot_series(&series, Path::new("unused.svg")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }
}
