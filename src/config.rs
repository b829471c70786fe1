//! Run constants.
//!
//! Nothing here is read from flags, files or the environment: the sources,
//! region and output layout are fixed. Only the base directory (where the
//! executable lives) and today's date are resolved at startup.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use crate::chart::{CHARTS, ChartCanvas, ChartSpec};
use crate::domain::{DEFAULT_REGION, Dataset};
use crate::error::AppError;

pub const STATS_DIR: &str = "stats";
pub const GRAPHS_DIR: &str = "graphs";
pub const LOG_FILE: &str = "covidtracker.log";

/// Format of the date stamp in chart file names.
pub const DATE_STAMP_FORMAT: &str = "%d-%m-%Y";

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub base_dir: PathBuf,
    pub stats_dir: PathBuf,
    pub graphs_dir: PathBuf,
    pub log_path: PathBuf,
    pub region: String,
    pub datasets: Vec<Dataset>,
    pub charts: Vec<ChartSpec>,
    pub canvas: ChartCanvas,
    pub today: NaiveDate,
}

impl TrackerConfig {
    /// Paths relative to the directory holding the running executable.
    pub fn from_executable_dir() -> Result<Self, AppError> {
        let exe = std::env::current_exe()
            .map_err(|e| AppError::setup(format!("Failed to locate the running executable: {e}")))?;
        let base_dir = exe
            .parent()
            .ok_or_else(|| AppError::setup(format!("Executable '{}' has no parent directory.", exe.display())))?;
        Ok(Self::with_base_dir(base_dir, Local::now().date_naive()))
    }

    pub fn with_base_dir(base_dir: &Path, today: NaiveDate) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            stats_dir: base_dir.join(STATS_DIR),
            graphs_dir: base_dir.join(GRAPHS_DIR),
            log_path: base_dir.join(LOG_FILE),
            region: DEFAULT_REGION.to_string(),
            datasets: Dataset::ALL.to_vec(),
            charts: CHARTS.to_vec(),
            canvas: ChartCanvas::default(),
            today,
        }
    }

    /// Today's date as used in chart file names (`DD-MM-YYYY`).
    pub fn date_stamp(&self) -> String {
        self.today.format(DATE_STAMP_FORMAT).to_string()
    }

    pub fn staged_path(&self, dataset: Dataset) -> PathBuf {
        self.stats_dir.join(dataset.staged_file_name())
    }
}
