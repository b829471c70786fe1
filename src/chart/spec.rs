use crate::domain::Dataset;

/// Moving-average windows (in samples) overlaid on every chart.
pub const TREND_WINDOWS: [usize; 2] = [3, 7];

/// How the main series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    /// One bar per day; suits daily counts.
    Bar,
    /// Markers joined by a line; suits running totals.
    PointLine,
}

/// Declarative description of one output chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSpec {
    /// File name stem, e.g. `cases_daily`.
    pub subject: &'static str,
    pub title: &'static str,
    /// Phrase shown on the busy indicator.
    pub description: &'static str,
    pub dataset: Dataset,
    pub y_column: &'static str,
    pub geometry: Geometry,
    pub trend_windows: &'static [usize],
}

impl ChartSpec {
    /// `<subject>_<DD-MM-YYYY>.<ext>`
    pub fn file_name(&self, date_stamp: &str, extension: &str) -> String {
        format!("{}_{}.{}", self.subject, date_stamp, extension)
    }
}

pub const CHARTS: [ChartSpec; 4] = [
    ChartSpec {
        subject: "cases_daily",
        title: "Daily COVID-19 Cases",
        description: "daily cases",
        dataset: Dataset::Cases,
        y_column: "Daily lab-confirmed cases",
        geometry: Geometry::Bar,
        trend_windows: &TREND_WINDOWS,
    },
    ChartSpec {
        subject: "cumulative_cases",
        title: "Cumulative Cases",
        description: "cumulative cases",
        dataset: Dataset::Cases,
        y_column: "Cumulative lab-confirmed cases",
        geometry: Geometry::PointLine,
        trend_windows: &TREND_WINDOWS,
    },
    ChartSpec {
        subject: "deaths_change_daily",
        title: "Daily Change in Deaths",
        description: "daily change in deaths",
        dataset: Dataset::Deaths,
        y_column: "Daily change in deaths",
        geometry: Geometry::Bar,
        trend_windows: &TREND_WINDOWS,
    },
    ChartSpec {
        subject: "cumulative_deaths",
        title: "Cumulative Deaths",
        description: "cumulative deaths",
        dataset: Dataset::Deaths,
        y_column: "Cumulative deaths",
        geometry: Geometry::PointLine,
        trend_windows: &TREND_WINDOWS,
    },
];
