// Convenience wrapper over plotters: series in, styled figure file out.
use std::path::Path;

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use crate::core::error::{Error, ErrorKind};

const PALETTE: [RGBColor; 6] = [BLUE, RED, GREEN, MAGENTA, CYAN, BLACK];

/// One plotted data set. `y_err` draws vertical error bars around each point.
#[derive(Clone, Debug, Default)]
pub struct Series {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub y_err: Option<Vec<f64>>,
    pub label: Option<String>,
}

impl Series {
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Self {
        Self {
            xs,
            ys,
            y_err: None,
            label: None,
        }
    }
}

/// Style defaults applied unless the caller overrides them.
#[derive(Clone, Debug)]
pub struct PlotOptions {
    pub title: Option<String>,
    pub x_label: String,
    pub y_label: String,
    /// Figure size in pixels.
    pub size: (u32, u32),
    /// Draw the mesh grid behind the data.
    pub grid: bool,
    /// Draw axes, tick labels, and axis descriptions.
    pub axes: bool,
    /// Connect points with a line.
    pub line: bool,
    /// Point marker radius in pixels; 0 disables markers.
    pub marker_size: u32,
    /// Explicit axis ranges; data bounds padded 5% otherwise.
    pub x_range: Option<(f64, f64)>,
    pub y_range: Option<(f64, f64)>,
}

impl PlotOptions {
    pub fn new() -> Self {
        Self {
            title: None,
            x_label: String::new(),
            y_label: String::new(),
            size: (900, 600),
            grid: true,
            axes: true,
            line: true,
            marker_size: 3,
            x_range: None,
            y_range: None,
        }
    }
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Plot one x/y series to `path`.
pub fn plot_xy(path: impl AsRef<Path>, xs: &[f64], ys: &[f64], options: &PlotOptions) -> Result<(), Error> {
    plot_series(
        path,
        &[Series::new(xs.to_vec(), ys.to_vec())],
        options,
    )
}

/// Plot several series to `path`. The backend follows the file extension:
/// `.svg` renders SVG, anything else a bitmap image. A legend is drawn when
/// any series carries a label.
pub fn plot_series(
    path: impl AsRef<Path>,
    series: &[Series],
    options: &PlotOptions,
) -> Result<(), Error> {
    let path = path.as_ref();
    validate(series)?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    if extension == "svg" {
        let root = SVGBackend::new(path, options.size).into_drawing_area();
        render(&root, series, options).map_err(|err| err.with_path(path))
    } else {
        let root = BitMapBackend::new(path, options.size).into_drawing_area();
        render(&root, series, options).map_err(|err| err.with_path(path))
    }
}

fn validate(series: &[Series]) -> Result<(), Error> {
    if series.is_empty() {
        return Err(Error::new(ErrorKind::Usage).with_message("no series to plot"));
    }
    for (idx, set) in series.iter().enumerate() {
        if set.xs.len() != set.ys.len() {
            return Err(Error::new(ErrorKind::Usage).with_message(format!(
                "series {idx} has {} x values but {} y values",
                set.xs.len(),
                set.ys.len()
            )));
        }
        if let Some(y_err) = &set.y_err {
            if y_err.len() != set.ys.len() {
                return Err(Error::new(ErrorKind::Usage).with_message(format!(
                    "series {idx} has {} error values for {} points",
                    y_err.len(),
                    set.ys.len()
                )));
            }
        }
    }
    Ok(())
}

fn render<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    series: &[Series],
    options: &PlotOptions,
) -> Result<(), Error> {
    root.fill(&WHITE).map_err(draw_failed)?;

    let (x_range, y_range) = ranges(series, options);

    let mut builder = ChartBuilder::on(root);
    builder.margin(12);
    if let Some(title) = &options.title {
        builder.caption(title, ("sans-serif", 22));
    }
    if options.axes {
        builder.x_label_area_size(40).y_label_area_size(56);
    }
    let mut chart = builder
        .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)
        .map_err(draw_failed)?;

    if options.axes {
        let mut mesh = chart.configure_mesh();
        if !options.grid {
            mesh.disable_mesh();
        }
        if !options.x_label.is_empty() {
            mesh.x_desc(options.x_label.as_str());
        }
        if !options.y_label.is_empty() {
            mesh.y_desc(options.y_label.as_str());
        }
        mesh.draw().map_err(draw_failed)?;
    }

    let mut has_labels = false;
    for (idx, set) in series.iter().enumerate() {
        let color = PALETTE[idx % PALETTE.len()];
        let points: Vec<(f64, f64)> = set
            .xs
            .iter()
            .copied()
            .zip(set.ys.iter().copied())
            .collect();
        let mut labeled = false;

        if options.line && points.len() > 1 {
            let anno = chart
                .draw_series(LineSeries::new(points.clone(), color.stroke_width(1)))
                .map_err(draw_failed)?;
            if let Some(label) = &set.label {
                anno.label(label.as_str()).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 16, y)], color.stroke_width(1))
                });
                labeled = true;
                has_labels = true;
            }
        }

        if options.marker_size > 0 {
            let marker_size = options.marker_size;
            let anno = chart
                .draw_series(
                    points
                        .iter()
                        .map(|&(x, y)| Circle::new((x, y), marker_size, color.filled())),
                )
                .map_err(draw_failed)?;
            if let Some(label) = &set.label {
                if !labeled {
                    anno.label(label.as_str())
                        .legend(move |(x, y)| Circle::new((x + 8, y), 3, color.filled()));
                    has_labels = true;
                }
            }
        }

        if let Some(y_err) = &set.y_err {
            chart
                .draw_series(points.iter().zip(y_err.iter()).map(|(&(x, y), &err)| {
                    ErrorBar::new_vertical(x, y - err, y, y + err, color.stroke_width(1), 6)
                }))
                .map_err(draw_failed)?;
        }
    }

    if has_labels {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(draw_failed)?;
    }

    root.present().map_err(draw_failed)
}

fn draw_failed<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> Error {
    Error::new(ErrorKind::Io).with_message(format!("plot render failed: {err}"))
}

/// Explicit ranges win; data bounds are padded 5% otherwise. Series with no
/// finite data fall back to the unit range so empty figures still export.
fn ranges(series: &[Series], options: &PlotOptions) -> ((f64, f64), (f64, f64)) {
    let xs = series.iter().flat_map(|set| set.xs.iter().copied());
    let ys = series.iter().flat_map(|set| {
        set.ys.iter().enumerate().flat_map(move |(idx, &y)| {
            let err = set
                .y_err
                .as_ref()
                .and_then(|errs| errs.get(idx).copied())
                .unwrap_or(0.0);
            [y - err, y + err]
        })
    });
    (
        options.x_range.unwrap_or_else(|| padded_bounds(xs)),
        options.y_range.unwrap_or_else(|| padded_bounds(ys)),
    )
}

fn padded_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for value in values.filter(|value| value.is_finite()) {
        min = min.min(value);
        max = max.max(value);
    }
    if min > max {
        return (0.0, 1.0);
    }
    let span = max - min;
    let pad = if span > 0.0 {
        span * 0.05
    } else if max.abs() > 0.0 {
        max.abs() * 0.05
    } else {
        0.5
    };
    (min - pad, max + pad)
}
