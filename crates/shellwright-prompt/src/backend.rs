//! The two interchangeable prompt backends

use std::sync::Arc;

use shellwright_config::BackendKind;

use crate::{composer::PromptComposer, context::PromptContext, delegate::DelegateRenderer, error::Result};

/// The backend a session is rendering with
#[derive(Clone)]
pub enum ActiveBackend {
    Delegate(Arc<DelegateRenderer>),
    Composed(Arc<PromptComposer>),
}

impl ActiveBackend {
    pub fn kind(&self) -> BackendKind {
        match self {
            ActiveBackend::Delegate(_) => BackendKind::Delegate,
            ActiveBackend::Composed(_) => BackendKind::Composed,
        }
    }

    pub fn probe(&self) -> bool {
        match self {
            ActiveBackend::Delegate(delegate) => delegate.probe(),
            ActiveBackend::Composed(composer) => composer.probe(),
        }
    }

    pub async fn render(&self, ctx: &PromptContext) -> Result<String> {
        match self {
            ActiveBackend::Delegate(delegate) => delegate.render(ctx).await,
            ActiveBackend::Composed(composer) => composer.render(ctx).await,
        }
    }
}

impl std::fmt::Debug for ActiveBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ActiveBackend({})", self.kind())
    }
}
