//! Repository status segment

use std::time::Duration;

use async_trait::async_trait;
use shellwright_config::{ComposedConfig, SegmentKind};
use shellwright_vcs::status_with_timeout;

use super::SegmentProvider;
use crate::{context::PromptContext, error::SegmentError};

/// Branch plus compact change indicators, e.g. `main +1 !2 ?3`.
///
/// Bounded by `vcsTimeoutMs`; a slow repository produces an error (and so
/// an omitted segment) rather than a late prompt.
#[derive(Debug, Default, Clone, Copy)]
pub struct VcsSegment;

#[async_trait]
impl SegmentProvider for VcsSegment {
    fn kind(&self) -> SegmentKind {
        SegmentKind::Vcs
    }

    async fn render(
        &self,
        ctx: &PromptContext,
        config: &ComposedConfig,
    ) -> Result<String, SegmentError> {
        let timeout = Duration::from_millis(config.vcs_timeout_ms);
        let status = status_with_timeout(ctx.cwd.clone(), timeout).await?;
        Ok(status.map(|s| s.summary()).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_outside_repository_is_omitted() {
        let dir = TempDir::new().unwrap();
        let config = ComposedConfig {
            vcs_timeout_ms: 5_000,
            ..ComposedConfig::default()
        };
        let text = VcsSegment
            .render(&PromptContext::new(dir.path()), &config)
            .await
            .unwrap();
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn test_branch_and_modified_indicator() {
        let dir = TempDir::new().unwrap();
        let repo = git2::Repository::init(dir.path()).unwrap();
        repo.set_head("refs/heads/main").unwrap();
        std::fs::write(dir.path().join("a.txt"), "one").unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(std::path::Path::new("a.txt")).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = git2::Signature::now("Test", "test@example.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
            .unwrap();
        std::fs::write(dir.path().join("a.txt"), "two").unwrap();

        let config = ComposedConfig {
            vcs_timeout_ms: 5_000,
            ..ComposedConfig::default()
        };
        let text = VcsSegment
            .render(&PromptContext::new(dir.path()), &config)
            .await
            .unwrap();
        assert_eq!(text, "main !1");
    }
}
