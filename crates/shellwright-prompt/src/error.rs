//! Prompt rendering errors

use shellwright_process::ProcessError;
use shellwright_vcs::VcsError;
use thiserror::Error;

/// Result type for backend renders
pub type Result<T> = std::result::Result<T, RenderBackendError>;

/// A backend failed to produce a prompt line.
///
/// Never reaches the shell: the manager turns it into a fallback line and
/// one warning.
#[derive(Debug, Error)]
pub enum RenderBackendError {
    /// The backend cannot run in this environment
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Renderer timed out after {millis}ms")]
    Timeout { millis: u64 },

    #[error("Renderer exited with status {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },

    #[error("Renderer produced no output")]
    EmptyOutput,

    #[error("Renderer process error: {0}")]
    Process(#[from] ProcessError),

    /// A segment provider failed or panicked
    #[error("Segment '{segment}' failed: {message}")]
    Segment { segment: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderBackendError {
    /// Map a process failure onto the render taxonomy
    pub fn from_process(error: ProcessError) -> Self {
        match error {
            ProcessError::Timeout { millis, .. } => RenderBackendError::Timeout { millis },
            ProcessError::NonZeroExit { code, stderr, .. } => {
                RenderBackendError::NonZeroExit { code, stderr }
            }
            ProcessError::SpawnFailed { command, source } => {
                RenderBackendError::Unavailable(format!("cannot start '{}': {}", command, source))
            }
            other => RenderBackendError::Process(other),
        }
    }
}

/// Why a single segment produced nothing
#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("VCS error: {0}")]
    Vcs(#[from] VcsError),

    #[error("Invalid timestamp format '{0}'")]
    TimestampFormat(String),

    #[error("{0}")]
    Other(String),
}
