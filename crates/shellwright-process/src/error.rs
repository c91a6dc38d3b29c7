//! Error types for process execution

use std::io;
use thiserror::Error;

/// Process execution errors
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The executable could not be started
    #[error("Failed to spawn '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The process did not finish before its deadline and was killed
    #[error("'{command}' timed out after {millis}ms")]
    Timeout { command: String, millis: u64 },

    /// The process exited unsuccessfully
    #[error("'{command}' exited with {}", describe_exit(.code, .stderr))]
    NonZeroExit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to kill process: {0}")]
    KillFailed(String),

    #[error("Invalid process configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ProcessError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProcessError::Timeout { .. })
    }
}

fn describe_exit(code: &Option<i32>, stderr: &str) -> String {
    let status = match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    };
    let stderr = stderr.trim();
    if stderr.is_empty() {
        status
    } else {
        format!("{}: {}", status, stderr)
    }
}

/// Result type for process operations
pub type Result<T> = std::result::Result<T, ProcessError>;
