//! Runtime prompt state

use serde::Serialize;
use shellwright_config::BackendKind;

/// Backend selection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "state", content = "backend")]
pub enum BackendState {
    Uninitialized,
    SelectingBackend,
    Active(BackendKind),
    Reloading,
}

impl BackendState {
    pub fn active(&self) -> Option<BackendKind> {
        match self {
            BackendState::Active(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// Snapshot of the prompt session, for diagnostics and the menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptSession {
    pub state: BackendState,
    /// Incremented on every reload
    pub generation: u64,
    /// Why the preferred backend is not the active one
    pub fallback_reason: Option<String>,
    pub last_render: Option<String>,
    pub last_error: Option<String>,
}

/// One render result, tagged with the generation it was started in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub text: String,
    pub generation: u64,
    pub backend: BackendKind,
    /// The backend failed and `text` is the fallback line
    pub fallback: bool,
}
