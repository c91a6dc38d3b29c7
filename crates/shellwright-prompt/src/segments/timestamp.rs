//! Clock segment

use std::fmt::Write;

use async_trait::async_trait;
use shellwright_config::{ComposedConfig, SegmentKind};

use super::SegmentProvider;
use crate::{context::PromptContext, error::SegmentError};

/// Render time formatted with `timestampFormat`
#[derive(Debug, Default, Clone, Copy)]
pub struct TimestampSegment;

#[async_trait]
impl SegmentProvider for TimestampSegment {
    fn kind(&self) -> SegmentKind {
        SegmentKind::Timestamp
    }

    async fn render(
        &self,
        ctx: &PromptContext,
        config: &ComposedConfig,
    ) -> Result<String, SegmentError> {
        // chrono reports a bad format string through fmt::Error
        let mut text = String::new();
        write!(text, "{}", ctx.now.format(&config.timestamp_format))
            .map_err(|_| SegmentError::TimestampFormat(config.timestamp_format.clone()))?;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn ctx() -> PromptContext {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        PromptContext::new("/").with_now(now)
    }

    #[tokio::test]
    async fn test_default_format() {
        let text = TimestampSegment
            .render(&ctx(), &ComposedConfig::default())
            .await
            .unwrap();
        assert_eq!(text, "14:05:07");
    }

    #[tokio::test]
    async fn test_custom_format() {
        let config = ComposedConfig {
            timestamp_format: "%Y-%m-%d".to_string(),
            ..ComposedConfig::default()
        };
        let text = TimestampSegment.render(&ctx(), &config).await.unwrap();
        assert_eq!(text, "2024-03-09");
    }

    #[tokio::test]
    async fn test_invalid_format_is_error() {
        let config = ComposedConfig {
            timestamp_format: "%Q".to_string(),
            ..ComposedConfig::default()
        };
        let err = TimestampSegment.render(&ctx(), &config).await.unwrap_err();
        assert!(matches!(err, SegmentError::TimestampFormat(_)));
    }
}
