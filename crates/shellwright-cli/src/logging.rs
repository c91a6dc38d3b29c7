// Tracing subscriber setup

use std::path::Path;
use std::sync::Mutex;

use shellwright_common::logging::{cleanup_older_than, open_daily_log};
use shellwright_config::{paths::expand_home, LoggingConfig};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive
pub const LOG_ENV_VAR: &str = "SHELLWRIGHT_LOG";

/// Filter used when `SHELLWRIGHT_LOG` is unset
pub fn default_directive(verbose: bool, logging: &LoggingConfig) -> &'static str {
    if verbose {
        "debug"
    } else if logging.enabled {
        "info"
    } else {
        "error"
    }
}

/// Install the global subscriber.
///
/// With file logging enabled, output goes to today's log file under
/// `logging.path` and expired files are removed first. Otherwise, or when
/// the file cannot be opened, output goes to stderr. Calling this twice
/// keeps the first subscriber.
pub fn init_logging(verbose: bool, logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, logging)));

    if logging.enabled {
        let dir = expand_home(&logging.path);
        match open_log(&dir, logging.retention_days) {
            Ok(file) => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .try_init();
                debug!(dir = %dir.display(), "file logging enabled");
                return;
            }
            Err(e) => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .try_init();
                warn!(dir = %dir.display(), error = %e, "cannot open log file, logging to stderr");
                return;
            }
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn open_log(dir: &Path, retention_days: u32) -> std::io::Result<std::fs::File> {
    cleanup_older_than(dir, retention_days)?;
    let (file, _path) = open_daily_log(dir)?;
    Ok(file)
}
