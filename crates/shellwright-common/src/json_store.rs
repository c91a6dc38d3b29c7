//! JSON persistence utilities
//!
//! Loading and atomically saving JSON documents. The configuration store
//! and the delegate renderer's default config both go through here.

use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// JSON store errors
#[derive(Debug, Error)]
pub enum JsonStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("File not found: {path}")]
    NotFound { path: String },
}

/// Result type for JSON store operations
pub type JsonStoreResult<T> = Result<T, JsonStoreError>;

/// Load JSON from a file path
pub fn load_json<T, P>(path: P) -> JsonStoreResult<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.exists() {
        return Err(JsonStoreError::NotFound {
            path: path.display().to_string(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    let value = serde_json::from_str(&content)?;
    Ok(value)
}

/// Save value as pretty JSON atomically (write to temp, then rename)
pub fn save_json_atomic<T, P>(path: P, value: &T) -> JsonStoreResult<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');
    write_atomic(path, content.as_bytes())
}

/// Write raw bytes atomically.
///
/// The temp file lives next to the target so the rename never crosses a
/// filesystem boundary.
pub fn write_atomic<P: AsRef<Path>>(path: P, contents: &[u8]) -> JsonStoreResult<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let temp_path = temp_path_for(path);
    std::fs::write(&temp_path, contents)?;

    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e.into());
    }

    Ok(())
}

/// Sibling temp path used by [`write_atomic`]
pub fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::tempdir;

    #[derive(Debug, Serialize, Deserialize, Default, PartialEq)]
    struct TestConfig {
        name: String,
        count: i32,
    }

    #[test]
    fn test_atomic_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("atomic.json");

        let config = TestConfig {
            name: "atomic".to_string(),
            count: 100,
        };

        save_json_atomic(&path, &config).unwrap();

        assert!(!temp_path_for(&path).exists());

        let loaded: TestConfig = load_json(&path).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let result: JsonStoreResult<TestConfig> = load_json(dir.path().join("missing.json"));
        assert!(matches!(result, Err(JsonStoreError::NotFound { .. })));
    }

    #[test]
    fn test_load_invalid_json_is_serialize_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result: JsonStoreResult<TestConfig> = load_json(&path);
        assert!(matches!(result, Err(JsonStoreError::Serialize(_))));
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("file.json");
        std::fs::write(&path, "old").unwrap();

        write_atomic(&path, b"new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }
}
