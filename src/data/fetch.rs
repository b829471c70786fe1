//! Staging of the published CSV files.
//!
//! Each dataset is refreshed at most once per calendar day: a staged copy
//! whose modification date is today is left alone. Download failures are
//! contained here; the caller only sees them counted in a [`FetchReport`].

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate};
use reqwest::blocking::Client;
use tracing::{error, info, warn};

use crate::domain::Dataset;
use crate::error::AppError;
use crate::io::ensure_dir;
use crate::term::Spinner;

const USER_AGENT: &str = concat!("covidtracker/", env!("CARGO_PKG_VERSION"));

/// Anything that can GET a URL and hand back the raw body.
pub trait HttpSource {
    fn get(&self, url: &str) -> Result<Vec<u8>, AppError>;
}

/// Blocking `reqwest` client. No timeout is configured.
pub struct ReqwestSource {
    client: Client,
}

impl ReqwestSource {
    pub fn new() -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| AppError::setup(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl HttpSource for ReqwestSource {
    fn get(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| AppError::network(format!("Request to {url} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::network(format!(
                "Request to {url} failed with status {}.",
                resp.status()
            )));
        }

        let body = resp
            .bytes()
            .map_err(|e| AppError::network(format!("Failed to read response from {url}: {e}")))?;
        Ok(body.to_vec())
    }
}

/// What happened to one dataset during a fetch pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The staged copy was already written today.
    Fresh,
    Downloaded { bytes: usize },
    Failed { reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    /// Set when the stats directory could not be created; no dataset was tried.
    pub dir_error: Option<String>,
    pub outcomes: Vec<(Dataset, FetchOutcome)>,
}

impl FetchReport {
    /// Number of recoverable failures in this pass.
    pub fn errors(&self) -> usize {
        let failed = self
            .outcomes
            .iter()
            .filter(|(_, o)| matches!(o, FetchOutcome::Failed { .. }))
            .count();
        failed + usize::from(self.dir_error.is_some())
    }

    pub fn outcome(&self, dataset: Dataset) -> Option<&FetchOutcome> {
        self.outcomes.iter().find(|(d, _)| *d == dataset).map(|(_, o)| o)
    }
}

/// Keeps `stats_dir` holding today's copy of each dataset.
pub struct Fetcher<S> {
    source: S,
    stats_dir: PathBuf,
    datasets: Vec<Dataset>,
    today: NaiveDate,
}

impl<S: HttpSource> Fetcher<S> {
    pub fn new(source: S, stats_dir: impl Into<PathBuf>, datasets: &[Dataset], today: NaiveDate) -> Self {
        Self {
            source,
            stats_dir: stats_dir.into(),
            datasets: datasets.to_vec(),
            today,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn staged_path(&self, dataset: Dataset) -> PathBuf {
        self.stats_dir.join(dataset.staged_file_name())
    }

    /// Refresh every stale dataset. Never fails; see [`FetchReport::errors`].
    pub fn ensure_latest(&self) -> FetchReport {
        let mut report = FetchReport::default();

        if let Err(e) = ensure_dir(&self.stats_dir, "stats") {
            error!(dir = %self.stats_dir.display(), "{e}");
            report.dir_error = Some(e.to_string());
            return report;
        }

        for &dataset in &self.datasets {
            let outcome = self.refresh(dataset);
            report.outcomes.push((dataset, outcome));
        }

        info!(errors = report.errors(), "fetch pass finished");
        report
    }

    fn refresh(&self, dataset: Dataset) -> FetchOutcome {
        let path = self.staged_path(dataset);

        if is_fresh(&path, self.today) {
            info!(dataset = %dataset, path = %path.display(), "staged copy is from today; skipping download");
            let spinner = Spinner::start(format!(" COVID-19 {dataset} already downloaded today."));
            spinner.ok();
            return FetchOutcome::Fresh;
        }

        let spinner = Spinner::start(format!(" Downloading COVID-19 {dataset}..."));
        match self.download(dataset, &path) {
            Ok(bytes) => {
                spinner.ok();
                info!(dataset = %dataset, bytes, "staged fresh copy");
                FetchOutcome::Downloaded { bytes }
            }
            Err(e) => {
                spinner.fail();
                warn!(dataset = %dataset, "download failed: {e}");
                FetchOutcome::Failed { reason: e.to_string() }
            }
        }
    }

    fn download(&self, dataset: Dataset, path: &Path) -> Result<usize, AppError> {
        let body = self.source.get(dataset.url())?;
        stage(path, &body)?;
        Ok(body.len())
    }
}

/// Replace `path` with `body` via a sibling `.part` file, so a failed write
/// never leaves a truncated copy that would pass as today's data.
fn stage(path: &Path, body: &[u8]) -> Result<(), AppError> {
    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);

    let result = fs::write(&part, body)
        .map_err(|e| AppError::io(format!("Failed to write '{}': {e}", part.display())))
        .and_then(|()| {
            fs::rename(&part, path)
                .map_err(|e| AppError::io(format!("Failed to replace '{}': {e}", path.display())))
        });

    if result.is_err() {
        let _ = fs::remove_file(&part);
    }
    result
}

/// `true` when `path` exists and was last modified on `today` (local time).
pub fn is_fresh(path: &Path, today: NaiveDate) -> bool {
    let Ok(meta) = fs::metadata(path) else {
        return false;
    };
    let Ok(modified) = meta.modified() else {
        return false;
    };
    DateTime::<Local>::from(modified).date_naive() == today
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Canned responses per URL, counting every call.
    #[derive(Default)]
    struct MockSource {
        responses: HashMap<&'static str, Result<Vec<u8>, AppError>>,
        calls: RefCell<Vec<String>>,
    }

    impl MockSource {
        fn serving_all() -> Self {
            let mut mock = Self::default();
            for d in Dataset::ALL {
                mock.responses.insert(d.url(), Ok(format!("body of {d}").into_bytes()));
            }
            mock
        }

        fn calls_to(&self, url: &str) -> usize {
            self.calls.borrow().iter().filter(|u| *u == url).count()
        }
    }

    impl HttpSource for MockSource {
        fn get(&self, url: &str) -> Result<Vec<u8>, AppError> {
            self.calls.borrow_mut().push(url.to_string());
            self.responses
                .get(url)
                .cloned()
                .unwrap_or_else(|| Err(AppError::network(format!("no route to {url}"))))
        }
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    #[test]
    fn downloads_create_stats_dir_and_staged_files() {
        let tmp = tempfile::tempdir().unwrap();
        let stats = tmp.path().join("stats");
        let fetcher = Fetcher::new(MockSource::serving_all(), &stats, &Dataset::ALL, today());

        let report = fetcher.ensure_latest();

        assert_eq!(report.errors(), 0);
        assert_eq!(
            fs::read(stats.join("covid-cases.csv")).unwrap(),
            b"body of cases".to_vec()
        );
        assert_eq!(
            report.outcome(Dataset::Deaths),
            Some(&FetchOutcome::Downloaded { bytes: 14 })
        );
    }

    #[test]
    fn second_run_on_same_day_does_not_refetch() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::new(MockSource::serving_all(), tmp.path(), &Dataset::ALL, today());

        fetcher.ensure_latest();
        let second = fetcher.ensure_latest();

        for d in Dataset::ALL {
            assert_eq!(fetcher.source().calls_to(d.url()), 1);
            assert_eq!(second.outcome(d), Some(&FetchOutcome::Fresh));
        }
    }

    #[test]
    fn stale_copy_is_overwritten() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("covid-cases.csv");
        fs::write(&path, b"yesterday's data, much longer than the new body").unwrap();

        // Pretend the run happens tomorrow so the file just written is stale.
        let tomorrow = today().succ_opt().unwrap();
        let fetcher = Fetcher::new(MockSource::serving_all(), tmp.path(), &[Dataset::Cases], tomorrow);
        let report = fetcher.ensure_latest();

        assert_eq!(report.errors(), 0);
        assert_eq!(fs::read(&path).unwrap(), b"body of cases".to_vec());
    }

    #[test]
    fn freshness_is_checked_per_file() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("covid-cases.csv"), b"cases from today").unwrap();

        let fetcher = Fetcher::new(MockSource::serving_all(), tmp.path(), &Dataset::ALL, today());
        let report = fetcher.ensure_latest();

        assert_eq!(report.outcome(Dataset::Cases), Some(&FetchOutcome::Fresh));
        assert_eq!(fetcher.source().calls_to(Dataset::Cases.url()), 0);
        assert_eq!(fetcher.source().calls_to(Dataset::Deaths.url()), 1);
        assert!(tmp.path().join("covid-deaths.csv").exists());
    }

    #[test]
    fn failed_cases_download_still_stages_deaths() {
        let tmp = tempfile::tempdir().unwrap();
        let mut mock = MockSource::serving_all();
        mock.responses.insert(
            Dataset::Cases.url(),
            Err(AppError::network("connection refused")),
        );

        let fetcher = Fetcher::new(mock, tmp.path(), &Dataset::ALL, today());
        let report = fetcher.ensure_latest();

        assert!(report.errors() >= 1);
        assert!(matches!(
            report.outcome(Dataset::Cases),
            Some(FetchOutcome::Failed { reason }) if reason.contains("connection refused")
        ));
        assert!(!tmp.path().join("covid-cases.csv").exists());
        assert_eq!(
            fs::read(tmp.path().join("covid-deaths.csv")).unwrap(),
            b"body of deaths".to_vec()
        );
    }

    #[test]
    fn unwritable_stats_dir_is_counted_not_raised() {
        let tmp = tempfile::tempdir().unwrap();
        // A regular file where the directory should be.
        let blocker = tmp.path().join("stats");
        fs::write(&blocker, b"").unwrap();

        let fetcher = Fetcher::new(MockSource::serving_all(), &blocker, &Dataset::ALL, today());
        let report = fetcher.ensure_latest();

        assert_eq!(report.errors(), 1);
        assert!(report.outcomes.is_empty());
        assert!(fetcher.source().calls.borrow().is_empty());
    }

    #[test]
    fn failed_write_keeps_previous_copy_stale() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("covid-cases.csv");
        fs::write(&path, b"old cases").unwrap();
        // A directory in the way of the partial file makes the write fail.
        fs::create_dir(tmp.path().join("covid-cases.csv.part")).unwrap();

        let tomorrow = today().succ_opt().unwrap();
        let fetcher = Fetcher::new(MockSource::serving_all(), tmp.path(), &[Dataset::Cases], tomorrow);
        let report = fetcher.ensure_latest();

        assert_eq!(report.errors(), 1);
        assert_eq!(fs::read(&path).unwrap(), b"old cases".to_vec());
        // Still stale, so the next run retries the download.
        assert!(!is_fresh(&path, tomorrow));
    }

    #[test]
    fn successful_download_leaves_no_partial_file() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::new(MockSource::serving_all(), tmp.path(), &[Dataset::Deaths], today());

        fetcher.ensure_latest();

        assert!(tmp.path().join("covid-deaths.csv").exists());
        assert!(!tmp.path().join("covid-deaths.csv.part").exists());
    }

    #[test]
    fn missing_file_is_not_fresh() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(!is_fresh(&tmp.path().join("nope.csv"), today()));
    }
}
