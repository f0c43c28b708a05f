//! # lutprint-lut
//!
//! 3D LUT handling for lutprint.
//!
//! - [`Lut3D`] - lattice of RGB outputs, R varying fastest
//! - [`cube`] - `.cube` writer and reader
//! - [`sampler`] - recovers a [`Lut3D`] from a transformed pattern image
//!
//! # Usage
//!
//! ```rust,ignore
//! use lutprint_core::{detect_geometry, TaskContext};
//! use lutprint_lut::{cube, sampler};
//!
//! let image = lutprint_io::read("graded.png")?;
//! let geometry = detect_geometry(image.width(), image.height())?;
//! let lut = sampler::sample_lut(&image, &geometry, &TaskContext::new())?;
//! cube::write_3d("graded.cube", &lut)?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
mod interp;
mod lut3d;
pub mod cube;
pub mod sampler;

pub use error::{LutError, LutResult};
pub use interp::Interpolation;
pub use lut3d::Lut3D;
pub use sampler::{extract_cube, sample_lut, sample_tile_color};
