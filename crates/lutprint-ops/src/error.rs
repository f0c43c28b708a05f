//! Error types for pattern generation and filtering.

use crate::script::ScriptError;
use lutprint_io::IoError;
use thiserror::Error;

/// Error type for lutprint operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Filter source failed to compile. Raised before any pixel is touched.
    #[error("filter script does not compile: {0}")]
    ScriptCompile(#[source] ScriptError),

    /// Filter failed while processing one pixel; the whole pass is aborted.
    #[error("filter failed at pixel ({x}, {y}): {message}")]
    FilterRuntime {
        /// Pixel column.
        x: u32,
        /// Pixel row.
        y: u32,
        /// Underlying script error.
        message: String,
    },

    /// Geometry, limit, buffer or cancellation error.
    #[error(transparent)]
    Core(#[from] lutprint_core::Error),

    /// Image encoding error.
    #[error(transparent)]
    Io(#[from] IoError),
}

impl OpsError {
    /// True when the operation stopped because it was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, OpsError::Core(e) if e.is_cancelled())
    }
}

/// Result type for lutprint operations.
pub type OpsResult<T> = Result<T, OpsError>;
