//! Per-process session

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use shellwright_common::{Diagnostics, TracingDiagnostics};
use shellwright_config::{BackendKind, ConfigStore};
use shellwright_features::FeatureRegistry;

use crate::manager::PromptManager;

/// Everything one interactive session works with.
///
/// Created once per process and passed to the menu and commands; there is
/// no global state. Tests build a fresh session each.
pub struct Session {
    store: Arc<ConfigStore>,
    prompt: PromptManager,
    features: FeatureRegistry,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Session {
    pub fn new(store: Arc<ConfigStore>, diagnostics: Arc<dyn Diagnostics>) -> Self {
        let prompt = PromptManager::new(Arc::clone(&store), Arc::clone(&diagnostics));
        Self::from_parts(store, prompt, diagnostics)
    }

    /// Session over the config file at `path`, reporting through `tracing`
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let diagnostics: Arc<dyn Diagnostics> = Arc::new(TracingDiagnostics);
        let store = Arc::new(ConfigStore::new(path).with_diagnostics(Arc::clone(&diagnostics)));
        Self::new(store, diagnostics)
    }

    pub fn from_parts(
        store: Arc<ConfigStore>,
        prompt: PromptManager,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        let features = FeatureRegistry::from_config(&store.get());
        Self {
            store,
            prompt,
            features,
            diagnostics,
        }
    }

    /// Select the prompt backend for this session
    pub fn start(&mut self) -> BackendKind {
        let kind = self.prompt.initialize();
        self.features.update(&self.store.get());
        kind
    }

    /// Apply configuration edits to the running session
    pub fn refresh(&mut self) -> BackendKind {
        let kind = self.prompt.reload();
        self.features.update(&self.store.get());
        kind
    }

    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    pub fn prompt(&self) -> &PromptManager {
        &self.prompt
    }

    pub fn features(&self) -> &FeatureRegistry {
        &self.features
    }

    pub fn diagnostics(&self) -> &Arc<dyn Diagnostics> {
        &self.diagnostics
    }

    pub fn enabled_features(&self) -> BTreeSet<String> {
        self.features.enabled_features()
    }
}
