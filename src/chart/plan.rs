//! Render-ready chart data.
//!
//! Everything a chart needs (points, overlays, bounds, tick counts) is
//! computed here, outside the drawing code, so it can be tested without a
//! backend or system fonts.

use chrono::{Duration, NaiveDate};

use crate::chart::spec::{ChartSpec, Geometry};
use crate::chart::trend::moving_average;
use crate::domain::Series;
use crate::error::AppError;

/// Days between x-axis date ticks.
pub const DATE_BREAK_DAYS: i64 = 3;

/// Upper bound on x tick labels; longer series widen the break to a multiple
/// of [`DATE_BREAK_DAYS`].
const MAX_X_LABELS: usize = 200;

/// Half the width of a daily bar, in days.
pub const BAR_HALF_WIDTH: f64 = 0.4;

#[derive(Debug, Clone, PartialEq)]
pub struct TrendLine {
    pub window: usize,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPlan {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub geometry: Geometry,
    /// Date at x = 0; x values are whole days after it.
    pub origin: NaiveDate,
    pub points: Vec<(f64, f64)>,
    pub trends: Vec<TrendLine>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    /// Tick positions, one every date break starting at the first date.
    pub x_ticks: Vec<f64>,
}

impl ChartPlan {
    pub fn build(spec: &ChartSpec, series: &Series) -> Result<Self, AppError> {
        let values = series.metric(spec.y_column)?;
        let origin = values
            .first()
            .map(|(d, _)| *d)
            .ok_or_else(|| {
                AppError::render(format!(
                    "No {} rows for {} to plot in `{}`.",
                    series.dataset, series.region, spec.y_column
                ))
            })?;

        let points: Vec<(f64, f64)> = values
            .iter()
            .map(|(d, y)| ((*d - origin).num_days() as f64, *y))
            .collect();

        let trends = spec
            .trend_windows
            .iter()
            .map(|&window| TrendLine {
                window,
                points: moving_average(&points, window),
            })
            .collect();

        let span_days = points.last().map(|(x, _)| *x).unwrap_or(0.0);
        let x_bounds = [-1.0, span_days + 1.0];
        let y_bounds = y_bounds(&points, spec.geometry);
        let x_ticks = date_breaks(span_days as i64);

        Ok(Self {
            title: spec.title.to_string(),
            x_label: series.dataset.date_column().to_string(),
            y_label: spec.y_column.to_string(),
            geometry: spec.geometry,
            origin,
            points,
            trends,
            x_bounds,
            y_bounds,
            x_ticks,
        })
    }

    /// Tick label for an x coordinate: the date it stands for.
    pub fn format_x(&self, x: f64) -> String {
        let date = self.origin + Duration::days(x.round() as i64);
        date.format("%d-%m-%Y").to_string()
    }
}

fn date_breaks(span_days: i64) -> Vec<f64> {
    let wanted = span_days / DATE_BREAK_DAYS + 1;
    let widen = (wanted + MAX_X_LABELS as i64 - 1) / MAX_X_LABELS as i64;
    let step = DATE_BREAK_DAYS * widen.max(1);
    (0..=span_days.max(0)).step_by(step as usize).map(|d| d as f64).collect()
}

fn y_bounds(points: &[(f64, f64)], geometry: Geometry) -> [f64; 2] {
    let (mut lo, mut hi) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));

    // Bars grow from zero, so zero must be on the axis.
    if geometry == Geometry::Bar {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }

    let pad = if (hi - lo).abs() > 1e-9 { (hi - lo) * 0.05 } else { 1.0 };
    if geometry == Geometry::Bar && lo >= 0.0 {
        [0.0, hi + pad]
    } else {
        lo -= pad;
        hi += pad;
        [lo, hi]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::spec::CHARTS;
    use crate::domain::{Dataset, Observation};

    fn cases(values: &[(u32, &str, &str)]) -> Series {
        Series {
            dataset: Dataset::Cases,
            region: "England".to_string(),
            columns: vec![
                "Area name".to_string(),
                "Specimen date".to_string(),
                "Daily lab-confirmed cases".to_string(),
                "Cumulative lab-confirmed cases".to_string(),
            ],
            rows: values
                .iter()
                .map(|(d, daily, cumulative)| Observation {
                    date: NaiveDate::from_ymd_opt(2020, 5, *d).unwrap(),
                    fields: vec![
                        "England".to_string(),
                        format!("2020-05-{d:02}"),
                        daily.to_string(),
                        cumulative.to_string(),
                    ],
                })
                .collect(),
        }
    }

    #[test]
    fn daily_bar_plan_starts_at_zero_and_carries_both_trends() {
        let series = cases(&[
            (1, "10", "10"),
            (2, "20", "30"),
            (3, "30", "60"),
            (5, "40", "100"),
            (6, "50", "150"),
            (7, "60", "210"),
            (8, "70", "280"),
        ]);

        let plan = ChartPlan::build(&CHARTS[0], &series).unwrap();

        assert_eq!(plan.geometry, Geometry::Bar);
        assert_eq!(plan.points[3], (4.0, 40.0));
        assert_eq!(plan.y_bounds[0], 0.0);
        assert!(plan.y_bounds[1] > 70.0);
        assert_eq!(plan.x_bounds, [-1.0, 8.0]);
        let windows: Vec<usize> = plan.trends.iter().map(|t| t.window).collect();
        assert_eq!(windows, vec![3, 7]);
        assert_eq!(plan.trends[0].points.len(), 5);
        assert_eq!(plan.trends[1].points, vec![(7.0, 40.0)]);
        assert_eq!(plan.x_label, "Specimen date");
    }

    #[test]
    fn x_ticks_follow_three_day_breaks() {
        let rows: Vec<(u32, &str, &str)> = (1..=31).map(|d| (d, "1", "1")).collect();
        let plan = ChartPlan::build(&CHARTS[1], &cases(&rows)).unwrap();
        assert_eq!(plan.x_ticks.len(), 11);
        assert_eq!(plan.x_ticks[..3], [0.0, 3.0, 6.0]);
        assert_eq!(plan.format_x(plan.x_ticks[1]), "04-05-2020");
        assert_eq!(plan.format_x(30.0), "31-05-2020");
    }

    #[test]
    fn long_series_widens_breaks_in_whole_multiples() {
        let ticks = date_breaks(900);
        assert!(ticks.len() <= MAX_X_LABELS);
        assert_eq!(ticks[1], 6.0);
        assert!(ticks.windows(2).all(|w| w[1] - w[0] == 6.0));
        assert_eq!(date_breaks(0), vec![0.0]);
    }

    #[test]
    fn cumulative_plan_pads_around_values() {
        let plan = ChartPlan::build(&CHARTS[1], &cases(&[(1, "1", "100"), (2, "1", "200")])).unwrap();
        assert_eq!(plan.geometry, Geometry::PointLine);
        assert!(plan.y_bounds[0] < 100.0 && plan.y_bounds[0] > 0.0);
        assert!(plan.y_bounds[1] > 200.0);
    }

    #[test]
    fn negative_daily_change_keeps_zero_inside_bounds() {
        let series = cases(&[(1, "-5", "1"), (2, "12", "2")]);
        let plan = ChartPlan::build(&CHARTS[0], &series).unwrap();
        assert!(plan.y_bounds[0] < -5.0);
        assert!(plan.y_bounds[1] > 12.0);
    }

    #[test]
    fn empty_series_cannot_be_planned() {
        let err = ChartPlan::build(&CHARTS[0], &cases(&[])).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_RENDER);
    }

    #[test]
    fn missing_column_fails_the_plan() {
        let err = ChartPlan::build(&CHARTS[2], &cases(&[(1, "1", "1")])).unwrap_err();
        assert!(err.message().contains("Daily change in deaths"));
    }
}
