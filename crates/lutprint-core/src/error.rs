//! Error types for lutprint-core operations.
//!
//! # Overview
//!
//! The [`Error`] enum covers the failure modes of the geometry layer and of
//! every cooperative loop built on [`crate::task`]:
//! - Invalid lattice / tile parameters
//! - Pattern dimensions larger than the host can rasterize
//! - Image dimensions that no `(N, M, layout)` reproduces
//! - Cooperative cancellation
//! - Pixel buffer bounds and size checks
//!
//! All of these are terminal for the operation that raised them. Nothing
//! retries automatically.
//!
//! # Usage
//!
//! ```rust
//! use lutprint_core::{detect_geometry, Error};
//!
//! match detect_geometry(1000, 7) {
//!     Err(Error::GeometryUndetectable { width, height }) => {
//!         assert_eq!((width, height), (1000, 7));
//!     }
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by geometry, detection, buffers and cooperative tasks.
#[derive(Debug, Error)]
pub enum Error {
    /// Lattice size or tile size outside the supported range.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Requested pattern does not fit into the host's maximum image dimension.
    ///
    /// `suggested_tile_size` is the largest tile size that would fit for the
    /// same lattice size, `floor(max_dimension / N²)`. It is zero when even a
    /// one-pixel tile is too large.
    #[error(
        "pattern is {width}x{height} pixels, exceeding the maximum supported dimension \
         {max_dimension}; use a tile size of at most {suggested_tile_size}"
    )]
    DimensionLimitExceeded {
        /// Computed pattern width.
        width: u64,
        /// Computed pattern height.
        height: u64,
        /// Host capability value.
        max_dimension: u32,
        /// Largest tile size that fits.
        suggested_tile_size: u32,
    },

    /// No `(N, M, layout)` reconstructs the image dimensions exactly.
    #[error(
        "cannot detect LUT geometry from a {width}x{height} image; it may have been \
         resized, cropped, or padded by the external process"
    )]
    GeometryUndetectable {
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
    },

    /// Cancellation was observed at a checkpoint. Partial output is discarded.
    #[error("operation cancelled")]
    Cancelled,

    /// Pixel coordinates are outside image bounds.
    #[error("pixel ({x}, {y}) out of bounds for image {width}x{height}")]
    OutOfBounds {
        /// X coordinate.
        x: u32,
        /// Y coordinate.
        y: u32,
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
    },

    /// Raw pixel data does not match the declared buffer shape.
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch {
        /// Expected byte count.
        expected: usize,
        /// Actual byte count.
        actual: usize,
    },
}

impl Error {
    /// True for [`Error::Cancelled`].
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
