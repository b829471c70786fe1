use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::AppError;
use crate::term::Spinner;

/// Create `dir` if needed, reporting presence on the busy indicator.
///
/// A freshly created directory is shown with the failure glyph, as a hint that
/// this is a first run rather than an error.
pub fn ensure_dir(dir: &Path, label: &str) -> Result<(), AppError> {
    let spinner = Spinner::start(format!(" Checking if '{label}' folder is present..."));
    if dir.is_dir() {
        spinner.ok();
        return Ok(());
    }
    spinner.fail();
    fs::create_dir_all(dir)
        .map_err(|e| AppError::io(format!("Failed to create '{}': {e}", dir.display())))?;
    info!(dir = %dir.display(), "created directory");
    Ok(())
}
