//! Error types for the themes module

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ThemeError {
    #[error("Unknown color token '{token}' (palette: {palette})")]
    UnknownColor { token: String, palette: String },

    #[error("Invalid color format: {0}")]
    InvalidFormat(String),
}

pub type Result<T> = std::result::Result<T, ThemeError>;
