//! Status line segments
//!
//! Each provider turns the render context into one piece of the prompt.
//! An empty string means "omit this segment". Providers may fail; the
//! composer drops a failed segment and reports it, so one broken segment
//! never costs the user their prompt.

pub mod path;
pub mod status;
pub mod timestamp;
pub mod vcs;
pub mod virtualenv;

use std::sync::Arc;

use async_trait::async_trait;
use shellwright_config::{ComposedConfig, SegmentKind};

use crate::{context::PromptContext, error::SegmentError};

pub use path::PathSegment;
pub use status::StatusSegment;
pub use timestamp::TimestampSegment;
pub use vcs::VcsSegment;
pub use virtualenv::VirtualEnvSegment;

/// Produces one segment of the status line
#[async_trait]
pub trait SegmentProvider: Send + Sync {
    /// Which configured segment this provider fills
    fn kind(&self) -> SegmentKind;

    /// Render the segment text, without color
    async fn render(
        &self,
        ctx: &PromptContext,
        config: &ComposedConfig,
    ) -> Result<String, SegmentError>;
}

/// One provider for every known segment
pub fn default_providers() -> Vec<Arc<dyn SegmentProvider>> {
    vec![
        Arc::new(PathSegment),
        Arc::new(VcsSegment),
        Arc::new(VirtualEnvSegment),
        Arc::new(TimestampSegment),
        Arc::new(StatusSegment),
    ]
}
