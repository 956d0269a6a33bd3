//! Chart rendering for sweep results.
//!
//! Everything renders to PNG through the bitmap backend. Error bars are
//! drawn as explicit vertical segments under the mean line, and the
//! log-scaled response chart uses a base-2 axis so saturation knees stay
//! visible at power-of-two ticks.

use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::analysis::{SweepMetric, SweepResults};
use crate::error::ChartError;

const CHART_SIZE: (u32, u32) = (960, 600);
const CAPTION_FONT: (&str, u32) = ("sans-serif", 22);
const LABEL_FONT: (&str, u32) = ("sans-serif", 14);

/// Series colors, cycled in order.
const PALETTE: [RGBColor; 5] = [BLUE, RED, GREEN, MAGENTA, CYAN];

/// A labeled line for the multi-series charts.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

fn render_err(path: &Path, err: impl std::fmt::Display) -> ChartError {
    ChartError::Render {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn ensure_nonempty<T>(path: &Path, points: &[T]) -> Result<(), ChartError> {
    if points.is_empty() {
        return Err(ChartError::EmptySeries {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Minimum-to-maximum x span, padded when all points share one x.
fn x_span(xs: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for x in xs {
        lo = lo.min(x);
        hi = hi.max(x);
    }
    if lo < hi { (lo, hi) } else { (lo - 0.5, lo + 0.5) }
}

/// Zero-based y range with headroom above the tallest point.
fn y_headroom(ys: impl Iterator<Item = f64>) -> f64 {
    let max = ys.fold(f64::NEG_INFINITY, f64::max);
    if max > 0.0 { max * 1.2 } else { 1.0 }
}

/// A single line through `points`, which must be in x order.
pub fn render_line(
    path: &Path,
    title: &str,
    x_label: &str,
    y_label: &str,
    points: &[(f64, f64)],
) -> Result<(), ChartError> {
    ensure_nonempty(path, points)?;
    let (x_lo, x_hi) = x_span(points.iter().map(|&(x, _)| x));
    let y_hi = y_headroom(points.iter().map(|&(_, y)| y));

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| render_err(path, e))?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, CAPTION_FONT)
        .margin(14)
        .x_label_area_size(44)
        .y_label_area_size(56)
        .build_cartesian_2d(x_lo..x_hi, 0.0..y_hi)
        .map_err(|e| render_err(path, e))?;
    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .label_style(LABEL_FONT)
        .draw()
        .map_err(|e| render_err(path, e))?;
    chart
        .draw_series(LineSeries::new(points.iter().copied(), &BLUE))
        .map_err(|e| render_err(path, e))?;
    root.present().map_err(|e| render_err(path, e))
}

/// Several labeled lines sharing both axes, with a legend.
pub fn render_multi_line(
    path: &Path,
    title: &str,
    x_label: &str,
    y_label: &str,
    series: &[MetricSeries],
) -> Result<(), ChartError> {
    ensure_nonempty(path, series)?;
    for s in series {
        ensure_nonempty(path, &s.points)?;
    }
    let (x_lo, x_hi) = x_span(series.iter().flat_map(|s| s.points.iter().map(|&(x, _)| x)));
    let y_hi = y_headroom(series.iter().flat_map(|s| s.points.iter().map(|&(_, y)| y)));

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| render_err(path, e))?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, CAPTION_FONT)
        .margin(14)
        .x_label_area_size(44)
        .y_label_area_size(56)
        .build_cartesian_2d(x_lo..x_hi, 0.0..y_hi)
        .map_err(|e| render_err(path, e))?;
    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .label_style(LABEL_FONT)
        .draw()
        .map_err(|e| render_err(path, e))?;

    for (i, s) in series.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        chart
            .draw_series(LineSeries::new(s.points.iter().copied(), color))
            .map_err(|e| render_err(path, e))?
            .label(s.label.clone())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 16, y)], color.stroke_width(2))
            });
    }
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.85))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| render_err(path, e))?;
    root.present().map_err(|e| render_err(path, e))
}

/// Unconnected circles, one per raw trial. Points need not be ordered.
pub fn render_scatter(
    path: &Path,
    title: &str,
    x_label: &str,
    y_label: &str,
    points: &[(f64, f64)],
) -> Result<(), ChartError> {
    ensure_nonempty(path, points)?;
    let (x_lo, x_hi) = x_span(points.iter().map(|&(x, _)| x));
    let y_hi = y_headroom(points.iter().map(|&(_, y)| y));

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| render_err(path, e))?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, CAPTION_FONT)
        .margin(14)
        .x_label_area_size(44)
        .y_label_area_size(56)
        .build_cartesian_2d(x_lo..x_hi, 0.0..y_hi)
        .map_err(|e| render_err(path, e))?;
    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .label_style(LABEL_FONT)
        .draw()
        .map_err(|e| render_err(path, e))?;
    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 3, BLUE.filled())),
        )
        .map_err(|e| render_err(path, e))?;
    root.present().map_err(|e| render_err(path, e))
}

/// A mean line with vertical error bars: `points` are
/// `(x, mean, half_width)` triples in x order.
pub fn render_errorbar(
    path: &Path,
    title: &str,
    x_label: &str,
    y_label: &str,
    points: &[(f64, f64, f64)],
) -> Result<(), ChartError> {
    ensure_nonempty(path, points)?;
    let (x_lo, x_hi) = x_span(points.iter().map(|&(x, _, _)| x));
    let mut y_lo = f64::INFINITY;
    let mut y_hi = f64::NEG_INFINITY;
    for &(_, y, e) in points {
        y_lo = y_lo.min(y - e);
        y_hi = y_hi.max(y + e);
    }
    let y_lo = y_lo.min(0.0);
    let y_hi = if y_hi > 0.0 { y_hi * 1.2 } else { 1.0 };

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| render_err(path, e))?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, CAPTION_FONT)
        .margin(14)
        .x_label_area_size(44)
        .y_label_area_size(56)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
        .map_err(|e| render_err(path, e))?;
    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .label_style(LABEL_FONT)
        .draw()
        .map_err(|e| render_err(path, e))?;
    chart
        .draw_series(LineSeries::new(
            points.iter().map(|&(x, y, _)| (x, y)),
            &BLUE,
        ))
        .map_err(|e| render_err(path, e))?;
    chart
        .draw_series(points.iter().map(|&(x, y, e)| {
            PathElement::new(vec![(x, y - e), (x, y + e)], BLUE.stroke_width(2))
        }))
        .map_err(|e| render_err(path, e))?;
    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y, _)| Circle::new((x, y), 3, BLUE.filled())),
        )
        .map_err(|e| render_err(path, e))?;
    root.present().map_err(|e| render_err(path, e))
}

/// [`render_errorbar`] with a base-2 logarithmic y axis, so the axis ticks
/// land on powers of two. Bar ends below the axis floor are clamped to it.
pub fn render_log_errorbar(
    path: &Path,
    title: &str,
    x_label: &str,
    y_label: &str,
    points: &[(f64, f64, f64)],
) -> Result<(), ChartError> {
    ensure_nonempty(path, points)?;
    let (x_lo, x_hi) = x_span(points.iter().map(|&(x, _, _)| x));
    let mut y_lo = f64::INFINITY;
    let mut y_hi = f64::NEG_INFINITY;
    for &(_, y, e) in points {
        y_hi = y_hi.max(y + e);
        if y - e > 0.0 {
            y_lo = y_lo.min(y - e);
        }
    }
    if y_hi <= 0.0 {
        y_hi = 2.0;
    }
    if !y_lo.is_finite() || y_lo >= y_hi {
        y_lo = y_hi / 1024.0;
    }
    let y_hi = y_hi * 1.2;
    let floor = y_lo;

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| render_err(path, e))?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, CAPTION_FONT)
        .margin(14)
        .x_label_area_size(44)
        .y_label_area_size(56)
        .build_cartesian_2d(x_lo..x_hi, (y_lo..y_hi).log_scale().base(2.0))
        .map_err(|e| render_err(path, e))?;
    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .label_style(LABEL_FONT)
        .y_label_formatter(&|y| format!("{y}"))
        .draw()
        .map_err(|e| render_err(path, e))?;
    chart
        .draw_series(LineSeries::new(
            points.iter().map(|&(x, y, _)| (x, y)),
            &BLUE,
        ))
        .map_err(|e| render_err(path, e))?;
    chart
        .draw_series(points.iter().map(|&(x, y, e)| {
            PathElement::new(
                vec![(x, (y - e).max(floor)), (x, y + e)],
                BLUE.stroke_width(2),
            )
        }))
        .map_err(|e| render_err(path, e))?;
    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y, _)| Circle::new((x, y), 3, BLUE.filled())),
        )
        .map_err(|e| render_err(path, e))?;
    root.present().map_err(|e| render_err(path, e))
}

/// Render the standard chart suite for a completed sweep and return the
/// written paths in order.
///
/// File names follow the `<metric>_<variable>.png` convention; the two
/// trial-level scatters are sweep-independent and keep fixed names.
pub fn render_sweep_charts(
    results: &SweepResults,
    dir: &Path,
) -> Result<Vec<PathBuf>, ChartError> {
    let var = &results.variable;
    let label = &results.label;
    let mut written = Vec::new();

    let resp: Vec<(f64, f64, f64)> = results
        .points
        .iter()
        .map(|p| (p.x, p.resp_time.mean, p.resp_time.half_width()))
        .collect();
    let resp_label = SweepMetric::RespTime.label();

    let path = dir.join(format!("{}_{var}.png", SweepMetric::RespTime.short_label()));
    render_errorbar(
        &path,
        &format!("Response Times vs. {label}"),
        label,
        resp_label,
        &resp,
    )?;
    written.push(path);

    let path = dir.join(format!(
        "{}_{var}_log.png",
        SweepMetric::RespTime.short_label()
    ));
    render_log_errorbar(
        &path,
        &format!("Response Times vs. {label}"),
        label,
        resp_label,
        &resp,
    )?;
    written.push(path);

    let path = dir.join(format!("{}_{var}.png", SweepMetric::Throughput.short_label()));
    let tput_series: Vec<MetricSeries> = [
        SweepMetric::Throughput,
        SweepMetric::Goodput,
        SweepMetric::Badput,
    ]
    .iter()
    .map(|&m| MetricSeries {
        label: m.label().to_string(),
        points: results.series(m),
    })
    .collect();
    render_multi_line(
        &path,
        &format!("Throughput vs. {label}"),
        label,
        "Requests / s",
        &tput_series,
    )?;
    written.push(path);

    let path = dir.join(format!("{}_{var}.png", SweepMetric::CpuUtil.short_label()));
    render_line(
        &path,
        &format!("CPU Utilization vs. {label}"),
        label,
        SweepMetric::CpuUtil.label(),
        &results.series(SweepMetric::CpuUtil),
    )?;
    written.push(path);

    let path = dir.join(format!(
        "{}_{var}.png",
        SweepMetric::TotalFailedFrac.short_label()
    ));
    let frac_series: Vec<MetricSeries> = [
        SweepMetric::TotalFailedFrac,
        SweepMetric::TimedoutFrac,
        SweepMetric::DroppedFrac,
    ]
    .iter()
    .map(|&m| MetricSeries {
        label: m.label().to_string(),
        points: results.series(m),
    })
    .collect();
    render_multi_line(
        &path,
        &format!("Fraction of Requests Failed vs. {label}"),
        label,
        "Fraction of Requests",
        &frac_series,
    )?;
    written.push(path);

    let path = dir.join(format!("{}_{var}.png", SweepMetric::DropRate.short_label()));
    render_line(
        &path,
        &format!("Drop Rate vs. {label}"),
        label,
        SweepMetric::DropRate.label(),
        &results.series(SweepMetric::DropRate),
    )?;
    written.push(path);

    let resp_tput: Vec<(f64, f64)> = results
        .samples
        .throughput
        .iter()
        .copied()
        .zip(results.samples.resp_time.iter().copied())
        .collect();
    let path = dir.join("resp_tput.png");
    render_scatter(
        &path,
        "Response Time vs. Throughput",
        SweepMetric::Throughput.label(),
        resp_label,
        &resp_tput,
    )?;
    written.push(path);

    let util_tput: Vec<(f64, f64)> = results
        .samples
        .throughput
        .iter()
        .copied()
        .zip(results.samples.cpu_util.iter().copied())
        .collect();
    let path = dir.join("util_tput.png");
    render_scatter(
        &path,
        "CPU Utilization vs. Throughput",
        SweepMetric::Throughput.label(),
        "Server CPU Utilization",
        &util_tput,
    )?;
    written.push(path);

    Ok(written)
}
