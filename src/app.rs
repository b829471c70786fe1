//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - resolves the fixed layout next to the executable
//! - opens the append-only run log
//! - runs the fetch -> load -> render pipeline
//! - prints the end-of-run summary

use tracing::{error, info};

use crate::chart::PngChartWriter;
use crate::config::TrackerConfig;
use crate::data::ReqwestSource;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `covidtracker` binary.
///
/// Counted failures (downloads, charts) still end in `Ok(())`; only an
/// unusable staged file or a setup problem is returned as an error.
pub fn run() -> Result<(), AppError> {
    let config = TrackerConfig::from_executable_dir()?;
    crate::logging::init(&config.log_path)?;
    info!(base_dir = %config.base_dir.display(), date = %config.date_stamp(), "run started");

    let source = ReqwestSource::new()?;
    let writer = PngChartWriter::new(config.canvas);

    let output = pipeline::run_pipeline(&config, source, &writer).inspect_err(|e| {
        error!(exit_code = e.exit_code(), "run aborted: {e}");
    })?;

    let errors = output.errors();
    info!(errors, "run finished");
    println!("{}", crate::term::summary_line(errors));
    Ok(())
}
