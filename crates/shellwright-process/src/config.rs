//! Process configuration

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ProcessError, Result};

/// Configuration for spawning a process
#[derive(Debug, Clone)]
pub struct ProcessConfig {
    /// Executable name or path
    pub command: String,
    pub args: Vec<String>,
    /// Working directory (None = current dir)
    pub working_dir: Option<PathBuf>,
    /// Variables added to the inherited environment
    pub env: BTreeMap<String, String>,
    /// Deadline for the whole run (None = wait forever)
    pub timeout: Option<Duration>,
    /// Time between SIGTERM and SIGKILL when killing; zero kills at once
    pub kill_grace: Duration,
}

impl ProcessConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: vec![],
            working_dir: None,
            env: BTreeMap::new(),
            timeout: None,
            kill_grace: Duration::from_millis(200),
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Add environment variable
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    pub fn kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.command.trim().is_empty() {
            return Err(ProcessError::InvalidConfig("empty command".to_string()));
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(ProcessError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }
        if let Some(key) = self.env.keys().find(|k| k.is_empty() || k.contains('=')) {
            return Err(ProcessError::InvalidConfig(format!(
                "invalid environment variable name '{}'",
                key
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = ProcessConfig::new("render")
            .args(["--shell", "bash"])
            .env("A", "1")
            .timeout(Duration::from_millis(500))
            .kill_grace(Duration::ZERO);
        assert_eq!(config.args, vec!["--shell", "bash"]);
        assert_eq!(config.env["A"], "1");
        assert_eq!(config.timeout, Some(Duration::from_millis(500)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        assert!(ProcessConfig::new(" ").validate().is_err());
        assert!(ProcessConfig::new("x")
            .timeout(Duration::ZERO)
            .validate()
            .is_err());
        assert!(ProcessConfig::new("x").env("A=B", "1").validate().is_err());
    }
}
