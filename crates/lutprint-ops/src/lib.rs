//! # lutprint-ops
//!
//! The two pixel-producing stages of lutprint.
//!
//! - [`pattern`] - rasterizes the identity lattice pattern and encodes it as PNG
//! - [`filter`] - applies a user script to every pixel of a buffer
//! - [`script`] - the small sandboxed language those scripts are written in
//!
//! Both stages run single-threaded and cooperatively: they take a
//! [`TaskContext`](lutprint_core::TaskContext), report progress at fixed
//! intervals and stop with a cancelled error when asked to.
//!
//! ```rust,ignore
//! use lutprint_core::{Geometry, Layout, TaskContext};
//! use lutprint_ops::{filter::PixelFilter, pattern};
//!
//! let ctx = TaskContext::new();
//! let geometry = Geometry::new(17, 8, Layout::Wide)?;
//! let mut image = pattern::generate_pattern(&geometry, 16_384, &ctx)?;
//!
//! let warm = PixelFilter::compile("R = R * 1.1; B = B * 0.9;")?;
//! warm.apply(&mut image, &ctx)?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod filter;
pub mod pattern;
pub mod script;

pub use error::{OpsError, OpsResult};
pub use filter::{pack_rgb, unpack_rgb, PixelFilter};
pub use pattern::{generate_pattern, pattern_geometry, render_pattern_png, DEFAULT_MAX_DIMENSION};
pub use script::{PixelInput, Script, ScriptError};
