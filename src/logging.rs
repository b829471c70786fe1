//! File logging.
//!
//! Every run appends to `covidtracker.log` next to the executable, so the
//! reason behind each counted failure survives the terminal session.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing::Level;

use crate::error::AppError;

const LOG_LEVEL: Level = Level::INFO;

/// Install the global subscriber writing to `path` in append mode.
///
/// Returns `Ok(false)` when a subscriber is already installed (tests, or a
/// host application), leaving the existing one in place.
pub fn init(path: &Path) -> Result<bool, AppError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AppError::setup(format!("Failed to open log file '{}': {e}", path.display())))?;

    let installed = tracing_subscriber::fmt()
        .with_max_level(LOG_LEVEL)
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .is_ok();

    Ok(installed)
}
