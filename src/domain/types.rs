use chrono::NaiveDate;

use crate::error::AppError;

const CASES_URL: &str = "https://coronavirus.data.gov.uk/downloads/csv/coronavirus-cases_latest.csv";
const DEATHS_URL: &str = "https://coronavirus.data.gov.uk/downloads/csv/coronavirus-deaths_latest.csv";

/// Region name column, shared by both published files.
pub const REGION_COLUMN: &str = "Area name";

/// Region every chart is drawn for.
pub const DEFAULT_REGION: &str = "England";

/// One of the remote CSV resources.
///
/// Each dataset knows where it is published, where its staged copy lives and
/// which columns carry the key fields. Columns are referenced by their exact
/// header text; there is no schema versioning upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dataset {
    Cases,
    Deaths,
}

impl Dataset {
    pub const ALL: [Dataset; 2] = [Dataset::Cases, Dataset::Deaths];

    pub fn url(self) -> &'static str {
        match self {
            Dataset::Cases => CASES_URL,
            Dataset::Deaths => DEATHS_URL,
        }
    }

    /// File name of the staged copy inside the stats directory.
    pub fn staged_file_name(self) -> &'static str {
        match self {
            Dataset::Cases => "covid-cases.csv",
            Dataset::Deaths => "covid-deaths.csv",
        }
    }

    pub fn region_column(self) -> &'static str {
        REGION_COLUMN
    }

    pub fn date_column(self) -> &'static str {
        match self {
            Dataset::Cases => "Specimen date",
            Dataset::Deaths => "Reporting date",
        }
    }

    /// Short lowercase label used in logs and status lines.
    pub fn label(self) -> &'static str {
        match self {
            Dataset::Cases => "cases",
            Dataset::Deaths => "deaths",
        }
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single kept CSV row: its parsed date plus every field as text.
///
/// `fields` is indexed like `Series::columns`.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub fields: Vec<String>,
}

/// Rows of one dataset restricted to one region, sorted ascending by date.
///
/// Guarantees (established by `io::load_series`):
/// - no field of any row is empty
/// - every row's region field equals `region`
/// - `rows[i].date <= rows[i + 1].date`
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub dataset: Dataset,
    pub region: String,
    pub columns: Vec<String>,
    pub rows: Vec<Observation>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.iter().map(|r| r.date)
    }

    /// Text values of a column, in row order.
    pub fn text_column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|r| r.fields.get(idx).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }

    /// Numeric `(date, value)` pairs for a metric column.
    ///
    /// Metric columns stay as text until a chart asks for them, so a bad value
    /// only fails the charts that plot that column.
    pub fn metric(&self, name: &str) -> Result<Vec<(NaiveDate, f64)>, AppError> {
        let idx = self.column_index(name).ok_or_else(|| {
            AppError::parse(format!(
                "Column `{name}` not found in {} data.",
                self.dataset
            ))
        })?;

        let mut out = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let raw = row.fields.get(idx).map(String::as_str).unwrap_or("");
            let value = parse_metric(raw).ok_or_else(|| {
                AppError::parse(format!(
                    "Invalid value '{raw}' in column `{name}` on {}.",
                    row.date
                ))
            })?;
            out.push((row.date, value));
        }
        Ok(out)
    }
}

fn parse_metric(raw: &str) -> Option<f64> {
    let v = raw.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 6, d).unwrap()
    }

    fn series() -> Series {
        Series {
            dataset: Dataset::Cases,
            region: "England".to_string(),
            columns: vec![
                "Area name".to_string(),
                "Specimen date".to_string(),
                "Daily lab-confirmed cases".to_string(),
                "Area type".to_string(),
            ],
            rows: vec![
                Observation {
                    date: day(1),
                    fields: vec!["England".into(), "2020-06-01".into(), "1570".into(), "Nation".into()],
                },
                Observation {
                    date: day(2),
                    fields: vec!["England".into(), "2020-06-02".into(), "1613.0".into(), "Nation".into()],
                },
            ],
        }
    }

    #[test]
    fn metric_parses_numeric_column() {
        let values = series().metric("Daily lab-confirmed cases").unwrap();
        assert_eq!(values, vec![(day(1), 1570.0), (day(2), 1613.0)]);
    }

    #[test]
    fn metric_rejects_missing_column() {
        let err = series().metric("Cumulative deaths").unwrap_err();
        assert!(err.message().contains("Cumulative deaths"));
    }

    #[test]
    fn metric_rejects_text_column() {
        let err = series().metric("Area type").unwrap_err();
        assert!(err.message().contains("Nation"));
    }

    #[test]
    fn dataset_columns_match_published_files() {
        assert_eq!(Dataset::Cases.date_column(), "Specimen date");
        assert_eq!(Dataset::Deaths.date_column(), "Reporting date");
        assert_eq!(Dataset::Deaths.staged_file_name(), "covid-deaths.csv");
        assert!(Dataset::Cases.url().ends_with("coronavirus-cases_latest.csv"));
    }
}
