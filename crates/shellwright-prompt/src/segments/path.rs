//! Current directory segment

use async_trait::async_trait;
use shellwright_config::{ComposedConfig, SegmentKind};

use super::SegmentProvider;
use crate::{context::PromptContext, error::SegmentError};

/// Working directory with `~` for home
#[derive(Debug, Default, Clone, Copy)]
pub struct PathSegment;

#[async_trait]
impl SegmentProvider for PathSegment {
    fn kind(&self) -> SegmentKind {
        SegmentKind::Path
    }

    async fn render(
        &self,
        ctx: &PromptContext,
        _config: &ComposedConfig,
    ) -> Result<String, SegmentError> {
        Ok(ctx.display_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_home_is_tilde() {
        let ctx = PromptContext::new("/home/me").with_home("/home/me");
        let text = PathSegment
            .render(&ctx, &ComposedConfig::default())
            .await
            .unwrap();
        assert_eq!(text, "~");
    }

    #[tokio::test]
    async fn test_outside_home_is_absolute() {
        let ctx = PromptContext::new("/srv/data").with_home("/home/me");
        let text = PathSegment
            .render(&ctx, &ComposedConfig::default())
            .await
            .unwrap();
        assert_eq!(text, "/srv/data");
    }
}
