//! Plotters-powered PNG output and the per-chart render loop.
//!
//! The loop isolates failures: each chart is planned, drawn and saved on its
//! own, and a failure (missing column, drawing error, even a panic inside the
//! backend) only marks that chart as failed.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use plotters::style::FontTransform;
use tracing::{error, info};

use crate::chart::plan::{BAR_HALF_WIDTH, ChartPlan};
use crate::chart::spec::{ChartSpec, Geometry};
use crate::chart::ChartCanvas;
use crate::domain::Series;
use crate::error::AppError;
use crate::io::ensure_dir;
use crate::term::Spinner;

/// Destination for planned charts.
pub trait ChartWriter {
    /// File extension for the produced artifacts, without the dot.
    fn extension(&self) -> &'static str;

    fn write(&self, plan: &ChartPlan, path: &Path) -> Result<(), AppError>;
}

/// Draws charts to PNG files with Plotters' bitmap backend.
pub struct PngChartWriter {
    canvas: ChartCanvas,
}

impl PngChartWriter {
    pub fn new(canvas: ChartCanvas) -> Self {
        Self { canvas }
    }
}

impl ChartWriter for PngChartWriter {
    fn extension(&self) -> &'static str {
        "png"
    }

    fn write(&self, plan: &ChartPlan, path: &Path) -> Result<(), AppError> {
        draw_png(plan, path, &self.canvas)
            .map_err(|e| AppError::render(format!("Failed to draw '{}' to '{}': {e}", plan.title, path.display())))
    }
}

fn draw_png(plan: &ChartPlan, path: &Path, canvas: &ChartCanvas) -> Result<(), Box<dyn std::error::Error>> {
    let [x0, x1] = plan.x_bounds;
    let [y0, y1] = plan.y_bounds;
    if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
        return Err(format!("degenerate bounds x={:?} y={:?}", plan.x_bounds, plan.y_bounds).into());
    }

    // Sizes below are in points and scaled to the canvas resolution.
    let pt = |points: f64| canvas.points_to_pixels(points);

    let root = BitMapBackend::new(path, canvas.pixel_size()).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&plan.title, ("sans-serif", pt(16.0)))
        .margin(pt(10.0))
        .set_label_area_size(LabelAreaPosition::Left, pt(60.0))
        .set_label_area_size(LabelAreaPosition::Bottom, pt(70.0))
        .build_cartesian_2d((x0..x1).with_key_points(plan.x_ticks.clone()), y0..y1)?;

    let format_x = |v: &f64| plan.format_x(*v);
    chart
        .configure_mesh()
        .x_labels(plan.x_ticks.len())
        .y_labels(10)
        .x_label_formatter(&format_x)
        .y_label_formatter(&|v| format!("{v:.0}"))
        .x_label_style(
            ("sans-serif", pt(8.0))
                .into_font()
                .transform(FontTransform::RotateAngle(45.0)),
        )
        .y_label_style(("sans-serif", pt(8.0)))
        .x_desc(plan.x_label.as_str())
        .y_desc(plan.y_label.as_str())
        .axis_desc_style(("sans-serif", pt(10.0)))
        .light_line_style(&BLACK.mix(0.08))
        .draw()?;

    let main_color = RGBColor(90, 90, 90);
    match plan.geometry {
        Geometry::Bar => {
            chart.draw_series(plan.points.iter().map(|&(x, y)| {
                Rectangle::new([(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, y)], main_color.filled())
            }))?;
        }
        Geometry::PointLine => {
            let line = ShapeStyle::from(&main_color).stroke_width(pt(0.75) as u32);
            chart.draw_series(LineSeries::new(plan.points.iter().copied(), line))?;
            chart.draw_series(PointSeries::of_element(
                plan.points.iter().copied(),
                pt(1.5) as u32,
                main_color.filled(),
                &|coord, size, style| EmptyElement::at(coord) + Circle::new((0, 0), size, style),
            ))?;
        }
    }

    // Trend overlays: short window cyan, long window blue.
    for trend in plan.trends.iter().filter(|t| !t.points.is_empty()) {
        let color = trend_color(trend.window);
        let width = pt(1.25) as u32;
        chart
            .draw_series(LineSeries::new(trend.points.iter().copied(), color.stroke_width(width)))?
            .label(format!("{}-day moving average", trend.window))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 40, y)], color.stroke_width(width)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font(("sans-serif", pt(8.0)))
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn trend_color(window: usize) -> RGBColor {
    match window {
        0..=3 => CYAN,
        4..=7 => BLUE,
        _ => RGBColor(120, 0, 160),
    }
}

/// Result of one render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Per chart subject: written path or the failure reason.
    pub outcomes: Vec<(&'static str, Result<PathBuf, String>)>,
}

impl RenderReport {
    pub fn errors(&self) -> usize {
        self.outcomes.iter().filter(|(_, r)| r.is_err()).count()
    }

    pub fn written(&self) -> impl Iterator<Item = &Path> {
        self.outcomes.iter().filter_map(|(_, r)| r.as_ref().ok().map(PathBuf::as_path))
    }
}

/// Render every chart in `charts` into `graphs_dir`.
///
/// Never fails as a whole. When `graphs_dir` cannot be created every chart is
/// recorded as failed, since none of them could be saved.
pub fn render_charts<W: ChartWriter + ?Sized>(
    series: &[Series],
    charts: &[ChartSpec],
    graphs_dir: &Path,
    date_stamp: &str,
    writer: &W,
) -> RenderReport {
    let mut report = RenderReport::default();

    if let Err(e) = ensure_dir(graphs_dir, "graphs") {
        error!(dir = %graphs_dir.display(), "{e}");
        for spec in charts {
            report.outcomes.push((spec.subject, Err(e.to_string())));
        }
        return report;
    }

    for spec in charts {
        let path = graphs_dir.join(spec.file_name(date_stamp, writer.extension()));
        let spinner = Spinner::start(format!(" Creating and saving the {} plot...", spec.description));

        match render_one(spec, series, &path, writer) {
            Ok(()) => {
                spinner.ok();
                info!(chart = spec.subject, path = %path.display(), "chart saved");
                report.outcomes.push((spec.subject, Ok(path)));
            }
            Err(e) => {
                spinner.fail();
                error!(chart = spec.subject, "{e}");
                eprintln!("{e}");
                report.outcomes.push((spec.subject, Err(e.to_string())));
            }
        }
    }

    info!(errors = report.errors(), "render pass finished");
    report
}

fn render_one<W: ChartWriter + ?Sized>(
    spec: &ChartSpec,
    series: &[Series],
    path: &Path,
    writer: &W,
) -> Result<(), AppError> {
    let source = series
        .iter()
        .find(|s| s.dataset == spec.dataset)
        .ok_or_else(|| AppError::render(format!("No {} data loaded for '{}'.", spec.dataset, spec.subject)))?;

    let plan = ChartPlan::build(spec, source)?;

    panic::catch_unwind(AssertUnwindSafe(|| writer.write(&plan, path))).unwrap_or_else(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(AppError::render(format!("Chart backend panicked on '{}': {reason}", spec.subject)))
    })
}
