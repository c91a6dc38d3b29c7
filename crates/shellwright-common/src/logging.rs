//! On-disk log file handling
//!
//! One file per day (`shellwright-YYYY-MM-DD.log`) in the configured
//! directory. Files older than the retention window are removed when the
//! log is opened.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::NaiveDate;
use tracing::debug;

const LOG_PREFIX: &str = "shellwright-";
const LOG_EXTENSION: &str = "log";

/// File name for the log of `date`
pub fn log_file_name(date: NaiveDate) -> String {
    format!("{LOG_PREFIX}{}.{LOG_EXTENSION}", date.format("%Y-%m-%d"))
}

/// Open (append) today's log file in `dir`, creating the directory.
pub fn open_daily_log(dir: &Path) -> std::io::Result<(File, PathBuf)> {
    fs::create_dir_all(dir)?;
    let path = dir.join(log_file_name(chrono::Local::now().date_naive()));
    let file = File::options().create(true).append(true).open(&path)?;
    Ok((file, path))
}

/// Remove shellwright log files in `dir` last modified more than
/// `retention_days` ago. Returns how many files were removed.
///
/// A retention of zero disables cleanup.
pub fn cleanup_older_than(dir: &Path, retention_days: u32) -> std::io::Result<usize> {
    if retention_days == 0 || !dir.exists() {
        return Ok(0);
    }

    let max_age = Duration::from_secs(u64::from(retention_days) * 24 * 60 * 60);
    let now = SystemTime::now();
    let mut removed = 0;

    for entry in fs::read_dir(dir)? {
        let Ok(entry) = entry else { continue };
        let path = entry.path();
        if !is_log_file(&path) {
            continue;
        }
        let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
            continue;
        };
        let age = now.duration_since(modified).unwrap_or_default();
        if age > max_age && fs::remove_file(&path).is_ok() {
            debug!(path = %path.display(), "Removed expired log file");
            removed += 1;
        }
    }

    Ok(removed)
}

fn is_log_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.starts_with(LOG_PREFIX) && path.extension().is_some_and(|ext| ext == LOG_EXTENSION)
}
