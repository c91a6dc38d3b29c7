//! Well-known file locations

use std::path::{Path, PathBuf};

const APP_DIR: &str = "shellwright";

fn config_root() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// `<config dir>/shellwright/config.json`
pub fn default_config_path() -> PathBuf {
    config_root().join(APP_DIR).join("config.json")
}

/// `<config dir>/shellwright/delegate/theme.json`
pub fn default_delegate_config_path() -> PathBuf {
    config_root().join(APP_DIR).join("delegate").join("theme.json")
}

/// `<cache dir>/shellwright/delegate`
pub fn default_delegate_cache_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
        .join("delegate")
}

/// `<data dir>/shellwright/logs`
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
        .join("logs")
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Replace the home directory prefix of `path` with `~`
pub fn abbreviate_home(path: &Path, home: Option<&Path>) -> String {
    if let Some(home) = home {
        if let Ok(rest) = path.strip_prefix(home) {
            if rest.as_os_str().is_empty() {
                return "~".to_string();
            }
            return format!("~{}{}", std::path::MAIN_SEPARATOR, rest.display());
        }
    }
    path.display().to_string()
}
