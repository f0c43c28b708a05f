//! # lutprint-core
//!
//! Core types shared by every lutprint crate.
//!
//! lutprint encodes a 3D color lattice as a grid of solid tiles in a raster
//! image, lets an external tool transform that image, and then reads the tiles
//! back to recover a `.cube` LUT. This crate holds the pieces everything else
//! is built on:
//!
//! - [`geometry`] - bijection between tile index, lattice coordinate and tile position
//! - [`detect`] - recovering `(N, M, layout)` from image dimensions alone
//! - [`buffer`] - the 8-bit [`PixelBuffer`] passed between stages
//! - [`task`] - cancellation and progress for cooperative long-running loops
//! - [`error`] - the shared [`Error`] type
//!
//! ## Crate Structure
//!
//! ```text
//! lutprint-core (this crate)
//!    ^
//!    +-- lutprint-io   (PNG decode/encode)
//!    +-- lutprint-lut  (Lut3D, .cube, tile sampler)
//!    +-- lutprint-ops  (pattern generator, pixel filter)
//!    +-- lutprint-cli  (the `lutprint` binary)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod detect;
pub mod error;
pub mod geometry;
pub mod task;

pub use buffer::PixelBuffer;
pub use detect::detect_geometry;
pub use error::{Error, Result};
pub use geometry::{
    compute_dims, lattice_to_tile, quantize, tile_coords, tile_index_to_rgb, Dims, Geometry,
    LatticeCoord, Layout, TilePos, MAX_LATTICE_SIZE, MIN_LATTICE_SIZE,
    RECOMMENDED_MAX_LATTICE_SIZE,
};
pub use task::{
    CancellationToken, Progress, TaskContext, PIXEL_YIELD_INTERVAL, TILE_YIELD_INTERVAL,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::buffer::PixelBuffer;
    pub use crate::detect::detect_geometry;
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{Geometry, Layout};
    pub use crate::task::{CancellationToken, TaskContext};
}
