//! Error types for VCS operations

use thiserror::Error;

/// Result type for VCS operations
pub type Result<T> = std::result::Result<T, VcsError>;

/// Errors that can occur during VCS operations
#[derive(Debug, Error)]
pub enum VcsError {
    /// Git repository error
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Repository not found at path: {path}")]
    RepositoryNotFound { path: String },

    #[error("Invalid repository state: {message}")]
    InvalidState { message: String },

    /// The status query did not finish before its deadline
    #[error("Repository status timed out after {millis}ms")]
    Timeout { millis: u64 },
}
