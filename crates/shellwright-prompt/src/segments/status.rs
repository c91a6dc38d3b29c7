//! Last exit status segment

use async_trait::async_trait;
use shellwright_config::{ComposedConfig, SegmentKind};

use super::SegmentProvider;
use crate::{context::PromptContext, error::SegmentError};

/// Exit code of the previous command, shown only when non-zero
#[derive(Debug, Default, Clone, Copy)]
pub struct StatusSegment;

#[async_trait]
impl SegmentProvider for StatusSegment {
    fn kind(&self) -> SegmentKind {
        SegmentKind::Status
    }

    async fn render(
        &self,
        ctx: &PromptContext,
        _config: &ComposedConfig,
    ) -> Result<String, SegmentError> {
        if ctx.exit_code == 0 {
            return Ok(String::new());
        }
        Ok(format!("✘{}", ctx.exit_code))
    }
}
