//! Built-in prompt backend

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::{future::join_all, FutureExt};
use shellwright_common::Diagnostics;
use shellwright_config::{ComposedConfig, SegmentKind};
use shellwright_themes::{Palette, RESET};
use tracing::debug;

use crate::{
    context::PromptContext,
    error::{RenderBackendError, Result},
    segments::{default_providers, SegmentProvider},
};

const AREA: &str = "prompt.segment";

/// Assembles segment providers into one colored line
pub struct PromptComposer {
    config: ComposedConfig,
    providers: BTreeMap<SegmentKind, Arc<dyn SegmentProvider>>,
    palette: Arc<dyn Palette>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl PromptComposer {
    pub fn new(
        config: ComposedConfig,
        palette: Arc<dyn Palette>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        let providers = default_providers()
            .into_iter()
            .map(|p| (p.kind(), p))
            .collect();
        Self {
            config,
            providers,
            palette,
            diagnostics,
        }
    }

    /// Replace the provider for the segment `provider` fills
    pub fn with_provider(mut self, provider: Arc<dyn SegmentProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    pub fn config(&self) -> &ComposedConfig {
        &self.config
    }

    /// Always available
    pub fn probe(&self) -> bool {
        true
    }

    /// Render the configured segments
    pub async fn render(&self, ctx: &PromptContext) -> Result<String> {
        Ok(self.compose(&self.config.enabled_segments(), ctx).await)
    }

    /// Render `segments` in order, joined by single spaces.
    ///
    /// Providers run concurrently. A provider that errors or panics is
    /// reported through the diagnostics sink and its segment omitted, as is
    /// any segment that renders empty.
    pub async fn compose(&self, segments: &[SegmentKind], ctx: &PromptContext) -> String {
        let renders = segments.iter().map(|kind| self.render_segment(*kind, ctx));
        let parts: Vec<String> = join_all(renders)
            .await
            .into_iter()
            .flatten()
            .collect();

        debug!(segments = parts.len(), "composed prompt");
        parts.join(" ")
    }

    async fn render_segment(&self, kind: SegmentKind, ctx: &PromptContext) -> Option<String> {
        let provider = self.providers.get(&kind)?;
        let outcome = AssertUnwindSafe(provider.render(ctx, &self.config))
            .catch_unwind()
            .await;

        let text = match outcome {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                self.report(kind, e.to_string());
                return None;
            }
            Err(panic) => {
                self.report(kind, panic_message(panic.as_ref()));
                return None;
            }
        };

        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        // Directory and branch names are untrusted; only the color codes
        // may reach the shell's prompt expansion.
        let text = ctx.shell.escape_text(text);
        Some(self.paint(kind, &text, ctx))
    }

    fn report(&self, kind: SegmentKind, message: String) {
        let error = RenderBackendError::Segment {
            segment: kind.to_string(),
            message,
        };
        self.diagnostics.log_error(AREA, &error);
    }

    /// Color `text` with the segment's configured color.
    ///
    /// Tokens were validated on write; one that no longer resolves (for
    /// example after a palette change) leaves the text uncolored.
    fn paint(&self, kind: SegmentKind, text: &str, ctx: &PromptContext) -> String {
        let Some(token) = self.config.colors.get(kind.as_str()) else {
            return text.to_string();
        };
        let Ok(color) = self.palette.resolve(token) else {
            return text.to_string();
        };
        let start = color.foreground();
        if start.is_empty() {
            return text.to_string();
        }
        format!(
            "{}{}{}",
            ctx.shell.zero_width(&start),
            text,
            ctx.shell.zero_width(RESET)
        )
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}
