//! LUT error types.

use thiserror::Error;

/// Result type for LUT operations.
pub type LutResult<T> = Result<T, LutError>;

/// Errors that can occur during LUT operations.
#[derive(Debug, Error)]
pub enum LutError {
    /// Invalid LUT size or data length.
    #[error("invalid LUT size: {0}")]
    InvalidSize(String),

    /// Parse error when loading LUT files.
    #[error("parse error at line {line}: {message}")]
    ParseError {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Geometry, buffer or cancellation error from the core crate.
    #[error(transparent)]
    Core(#[from] lutprint_core::Error),
}

impl LutError {
    /// True when the operation stopped because it was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LutError::Core(e) if e.is_cancelled())
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        LutError::ParseError {
            line,
            message: message.into(),
        }
    }
}
