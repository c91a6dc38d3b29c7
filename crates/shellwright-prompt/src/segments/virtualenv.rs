//! Active virtual environment segment

use std::path::Path;

use async_trait::async_trait;
use shellwright_config::{ComposedConfig, SegmentKind};

use super::SegmentProvider;
use crate::{context::PromptContext, error::SegmentError};

/// Name of the active Python virtualenv or conda environment
#[derive(Debug, Default, Clone, Copy)]
pub struct VirtualEnvSegment;

#[async_trait]
impl SegmentProvider for VirtualEnvSegment {
    fn kind(&self) -> SegmentKind {
        SegmentKind::VirtualEnv
    }

    async fn render(
        &self,
        ctx: &PromptContext,
        _config: &ComposedConfig,
    ) -> Result<String, SegmentError> {
        let Some(env) = ctx.virtual_env.as_deref().map(str::trim) else {
            return Ok(String::new());
        };
        // VIRTUAL_ENV is a path, CONDA_DEFAULT_ENV a bare name
        let name = Path::new(env)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| env.to_string());
        if name.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("({})", name))
    }
}
