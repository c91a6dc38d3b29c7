//! Backend selection, rendering with fallback, and live reload

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;
use shellwright_common::Diagnostics;
use shellwright_config::{BackendKind, ConfigError, ConfigStore, Configuration};
use tracing::{debug, info};

use crate::{
    backend::ActiveBackend,
    composer::PromptComposer,
    context::PromptContext,
    delegate::DelegateRenderer,
    prompt_session::{BackendState, PromptSession, RenderedPrompt},
    segments::SegmentProvider,
};

const AREA: &str = "prompt";

/// A render discarded as stale is retried once against the newer backend
const RENDER_ATTEMPTS: usize = 2;

struct Inner {
    state: BackendState,
    backend: Option<ActiveBackend>,
    /// Generation `backend` was selected in
    backend_generation: u64,
    fallback_reason: Option<String>,
    last_render: Option<String>,
    last_error: Option<String>,
}

/// Owns the active backend for a session.
///
/// Rendering never fails: backend errors become the context's fallback
/// line plus one warning. Every reload bumps a generation counter, and a
/// render that finishes after a newer reload is discarded.
pub struct PromptManager {
    store: Arc<ConfigStore>,
    diagnostics: Arc<dyn Diagnostics>,
    providers: Vec<Arc<dyn SegmentProvider>>,
    generation: AtomicU64,
    inner: Mutex<Inner>,
}

impl PromptManager {
    pub fn new(store: Arc<ConfigStore>, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            store,
            diagnostics,
            providers: Vec::new(),
            generation: AtomicU64::new(0),
            inner: Mutex::new(Inner {
                state: BackendState::Uninitialized,
                backend: None,
                backend_generation: 0,
                fallback_reason: None,
                last_render: None,
                last_error: None,
            }),
        }
    }

    /// Use `provider` in every composer this manager builds
    pub fn with_provider(mut self, provider: Arc<dyn SegmentProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Select the backend from the stored preference.
    ///
    /// A preferred delegate that fails its probe is replaced by the
    /// composer for this session only; the stored preference is kept.
    pub fn initialize(&self) -> BackendKind {
        self.inner.lock().state = BackendState::SelectingBackend;
        let config = self.store.get();
        self.select(&config, self.generation.load(Ordering::SeqCst))
    }

    /// Re-read the configuration and reselect the backend.
    ///
    /// Renders started before this call are discarded when they finish.
    pub fn reload(&self) -> BackendKind {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.lock().state = BackendState::Reloading;
        debug!(generation, "reloading prompt backend");

        let config = self.store.get();
        self.select(&config, generation)
    }

    /// Persist `kind` as the preferred backend, then reload.
    ///
    /// A failed write still switches this session (the store keeps the
    /// edit in memory) and the error is returned for display.
    pub fn switch_backend(&self, kind: BackendKind) -> Result<BackendKind, ConfigError> {
        info!(backend = %kind, "switching prompt backend");
        match self.store.set("prompt", json!({ "backend": kind.as_str() })) {
            Ok(_) => Ok(self.reload()),
            Err(e) if e.is_applied_in_memory() => {
                self.diagnostics.log_error(AREA, &e);
                self.reload();
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Render once, or `None` if a reload happened while rendering
    pub async fn render_tagged(&self, ctx: &PromptContext) -> Option<RenderedPrompt> {
        let (backend, generation) = match self.current() {
            Some(current) => current,
            None => {
                self.initialize();
                self.current()?
            }
        };
        let kind = backend.kind();

        let result = backend.render(ctx).await;

        let mut inner = self.inner.lock();
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, backend = %kind, "discarding stale render");
            return None;
        }

        let rendered = match result {
            Ok(text) if !text.trim().is_empty() => {
                inner.last_render = Some(text.clone());
                RenderedPrompt {
                    text,
                    generation,
                    backend: kind,
                    fallback: false,
                }
            }
            Ok(_) => RenderedPrompt {
                text: ctx.fallback_line(),
                generation,
                backend: kind,
                fallback: false,
            },
            Err(e) => {
                let message = format!("{} backend failed, showing fallback prompt: {}", kind, e);
                self.diagnostics.log_warning(AREA, &message);
                inner.last_error = Some(e.to_string());
                RenderedPrompt {
                    text: ctx.fallback_line(),
                    generation,
                    backend: kind,
                    fallback: true,
                }
            }
        };
        Some(rendered)
    }

    /// Render a line for the shell. Never empty, never an error.
    pub async fn render(&self, ctx: &PromptContext) -> String {
        for _ in 0..RENDER_ATTEMPTS {
            if let Some(rendered) = self.render_tagged(ctx).await {
                return rendered.text;
            }
        }
        ctx.fallback_line()
    }

    pub fn state(&self) -> BackendState {
        self.inner.lock().state
    }

    pub fn active_backend(&self) -> Option<BackendKind> {
        self.state().active()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn session_snapshot(&self) -> PromptSession {
        let inner = self.inner.lock();
        PromptSession {
            state: inner.state,
            generation: self.generation.load(Ordering::SeqCst),
            fallback_reason: inner.fallback_reason.clone(),
            last_render: inner.last_render.clone(),
            last_error: inner.last_error.clone(),
        }
    }

    fn current(&self) -> Option<(ActiveBackend, u64)> {
        let inner = self.inner.lock();
        inner
            .backend
            .clone()
            .map(|backend| (backend, inner.backend_generation))
    }

    fn select(&self, config: &Configuration, generation: u64) -> BackendKind {
        let (backend, fallback_reason) = self.choose(config);
        let kind = backend.kind();

        let mut inner = self.inner.lock();
        if generation < inner.backend_generation {
            // A newer reload already selected a backend
            return inner.state.active().unwrap_or(kind);
        }
        inner.backend = Some(backend);
        inner.backend_generation = generation;
        inner.fallback_reason = fallback_reason;
        inner.state = BackendState::Active(kind);
        info!(backend = %kind, generation, "prompt backend active");
        kind
    }

    fn choose(&self, config: &Configuration) -> (ActiveBackend, Option<String>) {
        let delegate = DelegateRenderer::new(config.prompt.delegate.clone());

        match config.prompt.backend {
            Some(BackendKind::Composed) => (self.composer(config), None),
            Some(BackendKind::Delegate) => match delegate.check() {
                Ok(()) => (self.delegate(delegate), None),
                Err(e) => {
                    let reason = format!(
                        "delegate renderer unavailable, using the composed prompt for this session: {}",
                        e
                    );
                    self.diagnostics.log_warning(AREA, &reason);
                    (self.composer(config), Some(reason))
                }
            },
            // No stated preference: the delegate wins when it is usable
            None => {
                if delegate.probe() {
                    (self.delegate(delegate), None)
                } else {
                    (self.composer(config), None)
                }
            }
        }
    }

    fn delegate(&self, delegate: DelegateRenderer) -> ActiveBackend {
        if let Err(e) = delegate.ensure_config() {
            self.diagnostics
                .log_warning(AREA, &format!("could not prepare renderer config: {}", e));
        }
        ActiveBackend::Delegate(Arc::new(delegate))
    }

    fn composer(&self, config: &Configuration) -> ActiveBackend {
        let composer = self.providers.iter().fold(
            PromptComposer::new(
                config.prompt.composed.clone(),
                self.store.palette(),
                Arc::clone(&self.diagnostics),
            ),
            |composer, provider| composer.with_provider(Arc::clone(provider)),
        );
        ActiveBackend::Composed(Arc::new(composer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SegmentError;
    use async_trait::async_trait;
    use shellwright_common::RecordingDiagnostics;
    use shellwright_config::{ComposedConfig, SegmentKind};
    use std::time::Duration;
    use tempfile::TempDir;

    struct SlowPath(Duration, &'static str);

    #[async_trait]
    impl SegmentProvider for SlowPath {
        fn kind(&self) -> SegmentKind {
            SegmentKind::Path
        }

        async fn render(
            &self,
            _ctx: &PromptContext,
            _config: &ComposedConfig,
        ) -> Result<String, SegmentError> {
            tokio::time::sleep(self.0).await;
            Ok(self.1.to_string())
        }
    }

    fn setup(doc: serde_json::Value) -> (TempDir, Arc<ConfigStore>, Arc<RecordingDiagnostics>) {
        let dir = TempDir::new().unwrap();
        let diagnostics = Arc::new(RecordingDiagnostics::new());
        let store = Arc::new(
            ConfigStore::new(dir.path().join("config.json"))
                .with_diagnostics(diagnostics.clone()),
        );
        store.set("", doc).unwrap();
        (dir, store, diagnostics)
    }

    fn missing_delegate(dir: &TempDir) -> serde_json::Value {
        json!({
            "executable": dir.path().join("no-renderer").display().to_string(),
            "configPath": dir.path().join("theme.json").display().to_string(),
            "cachePath": dir.path().join("cache").display().to_string(),
        })
    }

    #[test]
    fn test_starts_uninitialized() {
        let (_dir, store, diagnostics) = setup(json!({}));
        let manager = PromptManager::new(store, diagnostics);
        assert_eq!(manager.state(), BackendState::Uninitialized);
        assert_eq!(manager.active_backend(), None);
    }

    #[test]
    fn test_composed_preference() {
        let (_dir, store, diagnostics) = setup(json!({ "prompt": { "backend": "composed" } }));
        let manager = PromptManager::new(store, diagnostics);
        assert_eq!(manager.initialize(), BackendKind::Composed);
        assert_eq!(manager.state(), BackendState::Active(BackendKind::Composed));
    }

    #[test]
    fn test_unavailable_delegate_falls_back_and_keeps_preference() {
        let dir = TempDir::new().unwrap();
        let (_cfg_dir, store, diagnostics) = setup(json!({
            "prompt": { "backend": "delegate", "delegate": missing_delegate(&dir) }
        }));
        diagnostics.take();
        let manager = PromptManager::new(store.clone(), diagnostics.clone());

        assert_eq!(manager.initialize(), BackendKind::Composed);
        assert_eq!(diagnostics.warning_count(), 1);
        assert!(manager.session_snapshot().fallback_reason.is_some());
        assert_eq!(store.get().prompt.backend, Some(BackendKind::Delegate));
    }

    #[test]
    fn test_no_preference_without_delegate_is_composed_silently() {
        let dir = TempDir::new().unwrap();
        let (_cfg_dir, store, diagnostics) = setup(json!({
            "prompt": { "delegate": missing_delegate(&dir) }
        }));
        diagnostics.take();
        let manager = PromptManager::new(store, diagnostics.clone());

        assert_eq!(manager.initialize(), BackendKind::Composed);
        assert_eq!(diagnostics.warning_count(), 0);
    }

    #[test]
    fn test_reload_bumps_generation() {
        let (_dir, store, diagnostics) = setup(json!({ "prompt": { "backend": "composed" } }));
        let manager = PromptManager::new(store, diagnostics);
        manager.initialize();
        assert_eq!(manager.generation(), 0);
        manager.reload();
        manager.reload();
        assert_eq!(manager.generation(), 2);
        assert_eq!(manager.session_snapshot().generation, 2);
    }

    #[test]
    fn test_switch_backend_persists_preference() {
        let dir = TempDir::new().unwrap();
        let (_cfg_dir, store, diagnostics) = setup(json!({
            "prompt": { "backend": "composed", "delegate": missing_delegate(&dir) }
        }));
        let manager = PromptManager::new(store.clone(), diagnostics);
        manager.initialize();

        let active = manager.switch_backend(BackendKind::Delegate).unwrap();
        assert_eq!(active, BackendKind::Composed);
        assert_eq!(store.get().prompt.backend, Some(BackendKind::Delegate));
        assert_eq!(manager.generation(), 1);
    }

    #[tokio::test]
    async fn test_render_initializes_lazily() {
        let (dir, store, diagnostics) = setup(json!({
            "prompt": { "backend": "composed", "composed": { "colors": { "path": "default" }, "showVcsStatus": false } }
        }));
        let manager = PromptManager::new(store, diagnostics);
        let ctx = PromptContext::new(dir.path()).with_home(dir.path());

        assert_eq!(manager.render(&ctx).await, "~");
        assert_eq!(manager.active_backend(), Some(BackendKind::Composed));
        assert_eq!(manager.session_snapshot().last_render.as_deref(), Some("~"));
    }

    #[tokio::test]
    async fn test_stale_render_discarded() {
        let (dir, store, diagnostics) = setup(json!({
            "prompt": { "backend": "composed", "composed": { "colors": { "path": "default" }, "segments": ["path"] } }
        }));
        let manager = Arc::new(
            PromptManager::new(store, diagnostics)
                .with_provider(Arc::new(SlowPath(Duration::from_millis(300), "slow"))),
        );
        manager.initialize();

        let ctx = PromptContext::new(dir.path());
        let in_flight = {
            let manager = Arc::clone(&manager);
            let ctx = ctx.clone();
            tokio::spawn(async move { manager.render_tagged(&ctx).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        manager.reload();

        assert_eq!(in_flight.await.unwrap(), None);
        let fresh = manager.render_tagged(&ctx).await.unwrap();
        assert_eq!(fresh.generation, 1);
        assert_eq!(fresh.text, "slow");
    }
}
