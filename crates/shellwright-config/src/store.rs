//! Cached, atomically persisted configuration store
//!
//! The store keeps the raw JSON document alongside its parsed form. Edits
//! are deep-merged into the raw document, validated through the typed
//! model, and the raw document is written back whole. Keys and values this
//! version does not understand therefore survive every edit; load-time
//! repairs only ever apply to the parsed form.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use serde_json::Value;
use shellwright_common::{
    json_store::{load_json, save_json_atomic},
    Diagnostics, JsonStoreError, TracingDiagnostics,
};
use shellwright_themes::{AnsiPalette, Palette};
use tracing::{debug, info};

use crate::{
    error::{ConfigError, Result},
    merge::{merge_at_path, value_at_path},
    paths,
    types::{parse_lenient, Configuration},
};

/// How long a cached document is served before the file is re-read
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Overrides [`DEFAULT_CACHE_TTL`], in whole seconds
pub const TTL_ENV_VAR: &str = "SHELLWRIGHT_CONFIG_TTL_SECS";

const AREA: &str = "config";

struct CachedDocument {
    document: Value,
    config: Configuration,
    loaded_at: Instant,
}

#[derive(Default)]
struct StoreState {
    cache: Option<CachedDocument>,
    /// The last write failed; the cached document is newer than the file.
    pending_write: bool,
    /// The file on disk failed to parse and has not been backed up yet.
    corrupt_on_disk: bool,
    last_load_warning: Option<String>,
}

/// Configuration store
///
/// All reads go through a short-lived cache. Every mutating call writes
/// the full document synchronously (temp file + rename) before returning.
pub struct ConfigStore {
    path: PathBuf,
    ttl: Duration,
    palette: Arc<dyn Palette>,
    diagnostics: Arc<dyn Diagnostics>,
    state: Mutex<StoreState>,
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("path", &self.path)
            .field("ttl", &self.ttl)
            .field("palette", &self.palette.name())
            .finish()
    }
}

impl ConfigStore {
    /// Create a store for the document at `path`.
    ///
    /// Nothing is read until the first [`get`](Self::get) or
    /// [`load`](Self::load).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ttl: ttl_from_env().unwrap_or(DEFAULT_CACHE_TTL),
            palette: Arc::new(AnsiPalette::default()),
            diagnostics: Arc::new(TracingDiagnostics),
            state: Mutex::new(StoreState::default()),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_palette(mut self, palette: Arc<dyn Palette>) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// `<config dir>/shellwright/config.json`
    pub fn default_path() -> PathBuf {
        paths::default_config_path()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Palette used to validate color tokens
    pub fn palette(&self) -> Arc<dyn Palette> {
        Arc::clone(&self.palette)
    }

    /// Read the document from disk, replacing the cache.
    ///
    /// A missing file is created with defaults. An unreadable or corrupt
    /// file is left untouched and defaults are used in memory.
    pub fn load(&self) -> Configuration {
        let mut state = self.state.lock();
        self.load_locked(&mut state)
    }

    /// Cached configuration, reloaded once older than the TTL
    pub fn get(&self) -> Configuration {
        let mut state = self.state.lock();
        self.refresh_locked(&mut state);
        match &state.cache {
            Some(cached) => cached.config.clone(),
            None => self.load_locked(&mut state),
        }
    }

    /// Raw merged document, including keys the typed model ignores
    pub fn document(&self) -> Value {
        let mut state = self.state.lock();
        self.refresh_locked(&mut state);
        if state.cache.is_none() {
            self.load_locked(&mut state);
        }
        state
            .cache
            .as_ref()
            .map(|cached| cached.document.clone())
            .unwrap_or_else(Configuration::default_document)
    }

    /// Value at a dotted key path of the raw document
    pub fn get_path(&self, path: &str) -> Option<Value> {
        value_at_path(&self.document(), path).cloned()
    }

    /// Deep-merge `partial` into the document at `path` and persist it.
    ///
    /// Invalid edits are rejected before anything changes. A failed write
    /// returns [`ConfigError::Persistence`] but the edit stays visible
    /// through [`get`](Self::get) for the rest of the session.
    pub fn set(&self, path: &str, partial: Value) -> Result<Configuration> {
        let mut state = self.state.lock();
        self.refresh_locked(&mut state);
        if state.cache.is_none() {
            self.load_locked(&mut state);
        }

        let (previous, previous_config) = match &state.cache {
            Some(cached) => (cached.document.clone(), cached.config.clone()),
            None => (Configuration::default_document(), Configuration::default()),
        };
        let mut document = previous.clone();
        merge_at_path(&mut document, path, partial)?;
        let config = self.check_edit(&previous, &previous_config, &document)?;

        debug!(path, "configuration updated");
        self.commit_locked(&mut state, document, config.clone())?;
        Ok(config)
    }

    /// Overwrite the file with defaults.
    ///
    /// The in-memory configuration is reset even when the write fails.
    pub fn reset(&self) -> Result<Configuration> {
        let mut state = self.state.lock();
        let config = Configuration::default();
        info!(path = %self.path.display(), "resetting configuration to defaults");
        self.commit_locked(&mut state, Configuration::default_document(), config.clone())?;
        Ok(config)
    }

    /// Drop the cache so the next read goes to disk.
    ///
    /// Ignored while a write is pending, since the file is older than the
    /// cache in that case.
    pub fn invalidate(&self) {
        let mut state = self.state.lock();
        if state.pending_write {
            debug!("keeping cached configuration, a write is still pending");
            return;
        }
        state.cache = None;
    }

    /// Whether the last write failed and has not been retried successfully
    pub fn has_pending_write(&self) -> bool {
        self.state.lock().pending_write
    }

    /// Warning from the most recent load, if the file could not be used
    pub fn last_load_warning(&self) -> Option<String> {
        self.state.lock().last_load_warning.clone()
    }

    fn load_locked(&self, state: &mut StoreState) -> Configuration {
        state.pending_write = false;
        state.last_load_warning = None;

        match self.read_document() {
            Ok(Some((document, config))) => {
                state.corrupt_on_disk = false;
                self.cache_locked(state, document, config.clone());
                config
            }
            Ok(None) => {
                info!(path = %self.path.display(), "no configuration file, writing defaults");
                let config = Configuration::default();
                if let Err(e) = self.write_locked(state, &Configuration::default_document()) {
                    self.diagnostics.log_error(AREA, &e);
                    state.pending_write = true;
                }
                self.cache_locked(state, Configuration::default_document(), config.clone());
                config
            }
            Err(e) => {
                self.diagnostics.log_error(AREA, &e);
                state.corrupt_on_disk = self.path.exists();
                state.last_load_warning = Some(e.to_string());
                let config = Configuration::default();
                self.cache_locked(state, Configuration::default_document(), config.clone());
                config
            }
        }
    }

    /// `Ok(None)` when the file does not exist
    fn read_document(&self) -> Result<Option<(Value, Configuration)>> {
        let load_error = |message: String| ConfigError::Load {
            path: self.path.clone(),
            message,
        };

        let document: Value = match load_json(&self.path) {
            Ok(document) => document,
            Err(JsonStoreError::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(load_error(e.to_string())),
        };
        if !document.is_object() {
            return Err(load_error("top level is not a JSON object".to_string()));
        }

        let (parsed, warnings) = parse_lenient(&document);
        for warning in &warnings {
            self.diagnostics.log_warning(AREA, warning);
        }
        let config = parsed.map_err(|e| load_error(e.to_string()))?;
        Ok(Some((document, config)))
    }

    /// Validate `document`, the result of an edit to `previous`.
    ///
    /// The edit is rejected if it needs a repair the previous document did
    /// not, or if a field it changed fails strict validation. Problems that
    /// were already on disk are left for the loader's warnings.
    fn check_edit(
        &self,
        previous: &Value,
        previous_config: &Configuration,
        document: &Value,
    ) -> Result<Configuration> {
        let (_, existing) = parse_lenient(previous);
        let (parsed, repairs) = parse_lenient(document);
        if let Some(repair) = repairs.into_iter().find(|r| !existing.contains(r)) {
            return Err(ConfigError::Validation(repair));
        }

        let config = parsed.map_err(|e| ConfigError::Validation(e.to_string()))?;
        config.validate_changes(Some(previous_config), self.palette.as_ref())?;
        Ok(config)
    }

    /// Serve the cache, retrying a pending write or dropping it once stale.
    fn refresh_locked(&self, state: &mut StoreState) {
        let expired = match &state.cache {
            Some(cached) => cached.loaded_at.elapsed() >= self.ttl,
            None => return,
        };
        if !expired {
            return;
        }

        if state.pending_write {
            let document = state.cache.as_ref().map(|cached| cached.document.clone());
            if let Some(document) = document {
                match self.write_locked(state, &document) {
                    Ok(()) => {
                        info!(path = %self.path.display(), "pending configuration write succeeded");
                        state.pending_write = false;
                    }
                    Err(e) => debug!(error = %e, "pending configuration write failed again"),
                }
            }
            if let Some(cached) = state.cache.as_mut() {
                cached.loaded_at = Instant::now();
            }
            return;
        }

        debug!("configuration cache expired");
        state.cache = None;
    }

    fn commit_locked(
        &self,
        state: &mut StoreState,
        document: Value,
        config: Configuration,
    ) -> Result<()> {
        let written = self.write_locked(state, &document);
        self.cache_locked(state, document, config);
        state.pending_write = written.is_err();
        written
    }

    fn cache_locked(&self, state: &mut StoreState, document: Value, config: Configuration) {
        state.cache = Some(CachedDocument {
            document,
            config,
            loaded_at: Instant::now(),
        });
    }

    fn write_locked(&self, state: &mut StoreState, document: &Value) -> Result<()> {
        if state.corrupt_on_disk {
            let backup = self.corrupt_backup_path();
            std::fs::copy(&self.path, &backup).map_err(|e| ConfigError::Persistence {
                path: backup.clone(),
                message: format!("could not preserve unreadable configuration: {}", e),
            })?;
            info!(backup = %backup.display(), "preserved unreadable configuration");
            state.corrupt_on_disk = false;
        }

        save_json_atomic(&self.path, document).map_err(|e| ConfigError::Persistence {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    fn corrupt_backup_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "config.json".into());
        name.push(".corrupt");
        self.path.with_file_name(name)
    }
}

fn ttl_from_env() -> Option<Duration> {
    std::env::var(TTL_ENV_VAR)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
