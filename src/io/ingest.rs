//! CSV ingest and normalization.
//!
//! Turns a staged CSV into a `Series`: complete rows only, one region, typed
//! dates, ascending order.
//!
//! Unlike per-chart failures, every error here is fatal for the run: a missing
//! or malformed staged file means there is nothing trustworthy to plot.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, info};

use crate::domain::{Dataset, Observation, Series};
use crate::error::AppError;

/// Row accounting for a single load, logged after each dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub rows_read: usize,
    pub rows_incomplete: usize,
    pub rows_kept: usize,
}

/// Load a staged CSV and reduce it to the rows for `region`.
pub fn load_series(path: &Path, dataset: Dataset, region: &str) -> Result<Series, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open CSV '{}': {e}", path.display())))?;

    let (series, stats) = read_series(file, dataset, region)
        .map_err(|e| AppError::new(e.exit_code(), format!("{}: {e}", path.display())))?;

    info!(
        dataset = %dataset,
        rows_read = stats.rows_read,
        rows_incomplete = stats.rows_incomplete,
        rows_kept = stats.rows_kept,
        "loaded staged data"
    );

    Ok(series)
}

/// Reader-level variant of [`load_series`], used directly by tests.
pub fn read_series<R: std::io::Read>(
    input: R,
    dataset: Dataset,
    region: &str,
) -> Result<(Series, LoadStats), AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::parse(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let columns: Vec<String> = headers.iter().map(normalize_header_name).collect();
    let header_map = build_header_map(&columns);

    let region_idx = require_column(&header_map, dataset.region_column())?;
    let date_idx = require_column(&header_map, dataset.date_column())?;

    let mut stats = LoadStats::default();
    let mut rows = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header line; CSV lines are 1-based.
        let line = idx + 2;
        stats.rows_read += 1;

        let record = result.map_err(|e| AppError::parse(format!("CSV parse error on line {line}: {e}")))?;

        if !is_complete(&record, columns.len()) {
            stats.rows_incomplete += 1;
            continue;
        }

        // Exact match on the raw cell: padded or differently cased names are other regions.
        if record.get(region_idx) != Some(region) {
            continue;
        }

        let raw_date = record.get(date_idx).map(str::trim).unwrap_or("");
        let date = parse_date(raw_date)
            .map_err(|e| AppError::parse(format!("Line {line}: {e}")))?;

        rows.push(Observation {
            date,
            fields: record.iter().map(|f| f.trim().to_string()).collect(),
        });
    }

    // Stable: rows sharing a date keep their file order.
    rows.sort_by_key(|r| r.date);
    stats.rows_kept = rows.len();

    debug!(dataset = %dataset, region, kept = stats.rows_kept, "filtered and sorted");

    Ok((
        Series {
            dataset,
            region: region.to_string(),
            columns,
            rows,
        },
        stats,
    ))
}

fn build_header_map(columns: &[String]) -> HashMap<&str, usize> {
    columns
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.as_str(), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn require_column(header_map: &HashMap<&str, usize>, name: &str) -> Result<usize, AppError> {
    header_map
        .get(name)
        .copied()
        .ok_or_else(|| AppError::parse(format!("Missing required column: `{name}`")))
}

/// A record is complete when it spans every header and no field is blank.
fn is_complete(record: &StringRecord, width: usize) -> bool {
    record.len() >= width && record.iter().take(width).all(|f| !f.trim().is_empty())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // The dashboard publishes ISO dates; older exports used day-first forms.
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, DD-MM-YYYY, DD/MM/YYYY, YYYY/MM/DD."
    ))
}
