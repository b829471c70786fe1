//! Terminal presentation: the busy indicator and the end-of-run summary.

mod spinner;

pub use spinner::{FAIL_GLYPH, OK_GLYPH, Spinner};

/// Final line printed after a run.
pub fn summary_line(errors: usize) -> String {
    if errors > 0 {
        format!("⚠  {errors} errors were encountered during runtime. Check the logs...")
    } else {
        "❤  Success. Thank you for your patience.".to_string()
    }
}
