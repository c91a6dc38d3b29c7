//! Deep merge of JSON documents
//!
//! Objects merge key by key, recursively. Any other overlay value replaces
//! the base value, and an explicit `null` removes the key so it falls back
//! to its default on the next load.

use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{ConfigError, Result};

/// Merge `overlay` into `base` in place.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                if value.is_null() {
                    base_map.remove(&key);
                    continue;
                }
                match base_map.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_merge(existing, value)
                    }
                    Some(existing) => *existing = value,
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Split a dotted key path. The empty path names the root.
fn segments(path: &str) -> Result<Vec<&str>> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let parts: Vec<&str> = trimmed.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(ConfigError::InvalidPath {
            path: path.to_string(),
            message: "empty key segment".to_string(),
        });
    }
    Ok(parts)
}

/// Deep-merge `partial` into `document` at the dotted `path`.
///
/// Missing intermediate objects are created. Fails if a non-object value
/// sits on the path, since replacing it would silently drop data.
pub fn merge_at_path(document: &mut Value, path: &str, partial: Value) -> Result<()> {
    let keys = segments(path)?;
    trace!(path, "merging partial configuration");

    if !document.is_object() {
        *document = Value::Object(Map::new());
    }

    let Some((last, parents)) = keys.split_last() else {
        deep_merge(document, partial);
        return Ok(());
    };

    let mut cursor = document;
    for (depth, key) in parents.iter().enumerate() {
        let map = cursor.as_object_mut().ok_or_else(|| not_an_object(&keys[..depth]))?;
        cursor = map
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    let map = cursor
        .as_object_mut()
        .ok_or_else(|| not_an_object(parents))?;

    if partial.is_null() {
        map.remove(*last);
        return Ok(());
    }
    match map.get_mut(*last) {
        Some(existing) => deep_merge(existing, partial),
        None => {
            map.insert(last.to_string(), partial);
        }
    }
    Ok(())
}

fn not_an_object(keys: &[&str]) -> ConfigError {
    ConfigError::InvalidPath {
        path: keys.join("."),
        message: "value on the path is not an object".to_string(),
    }
}

/// Value at the dotted `path`, if present.
pub fn value_at_path<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    let keys = segments(path).ok()?;
    keys.iter().try_fold(document, |value, key| value.get(*key))
}
