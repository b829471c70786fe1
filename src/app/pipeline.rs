//! The fetch -> load -> render workflow.
//!
//! Kept apart from `app::run` so it can be driven with a mock HTTP source and
//! a recording chart writer.

use tracing::info;

use crate::chart::{ChartWriter, RenderReport, render_charts};
use crate::config::TrackerConfig;
use crate::data::{FetchReport, Fetcher, HttpSource};
use crate::domain::Series;
use crate::error::AppError;
use crate::io::load_series;

/// Everything a single run produced.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub fetch: FetchReport,
    pub series: Vec<Series>,
    pub render: RenderReport,
}

impl RunOutput {
    /// Recoverable failures across all stages.
    pub fn errors(&self) -> usize {
        self.fetch.errors() + self.render.errors()
    }
}

/// Execute the three stages in order.
///
/// Download and chart failures are counted in the output; a staged file that
/// is missing or malformed aborts the run with its error.
pub fn run_pipeline<S, W>(config: &TrackerConfig, source: S, writer: &W) -> Result<RunOutput, AppError>
where
    S: HttpSource,
    W: ChartWriter + ?Sized,
{
    // 1) Stage today's CSVs.
    let fetcher = Fetcher::new(source, &config.stats_dir, &config.datasets, config.today);
    let fetch = fetcher.ensure_latest();

    // 2) Reduce each to the region of interest.
    let series = load_all(config)?;

    // 3) Draw.
    let render = render_charts(
        &series,
        &config.charts,
        &config.graphs_dir,
        &config.date_stamp(),
        writer,
    );

    Ok(RunOutput { fetch, series, render })
}

/// Load every configured dataset from its staged copy.
pub fn load_all(config: &TrackerConfig) -> Result<Vec<Series>, AppError> {
    config
        .datasets
        .iter()
        .map(|&dataset| {
            let series = load_series(&config.staged_path(dataset), dataset, &config.region)?;
            info!(dataset = %dataset, rows = series.len(), region = %config.region, "series ready");
            Ok(series)
        })
        .collect()
}
