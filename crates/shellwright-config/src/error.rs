//! Configuration error types

use std::path::PathBuf;

use thiserror::Error;

/// Configuration result type
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    /// The file exists but could not be read or parsed. Defaults are used
    /// in memory and the file is left as is.
    #[error("Could not load configuration from {path}: {message}")]
    Load { path: PathBuf, message: String },

    /// The write failed. The edit is kept in memory for this session.
    #[error("Could not save configuration to {path}: {message} (change kept for this session only)")]
    Persistence { path: PathBuf, message: String },

    #[error("Invalid color '{token}' for segment '{segment}': {source}")]
    InvalidColorToken {
        segment: String,
        token: String,
        #[source]
        source: shellwright_themes::ThemeError,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid key path '{path}': {message}")]
    InvalidPath { path: String, message: String },
}

impl ConfigError {
    /// Whether the in-memory configuration already reflects the attempted
    /// change (only true for persistence failures).
    pub fn is_applied_in_memory(&self) -> bool {
        matches!(self, ConfigError::Persistence { .. })
    }
}
