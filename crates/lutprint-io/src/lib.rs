//! # lutprint-io
//!
//! PNG reading and writing for lutprint.
//!
//! Pattern images must survive storage bit-exactly, so PNG is the only
//! format. Every decoded image becomes an RGBA [`PixelBuffer`] regardless of
//! its stored color type, which is what the sampler and the pixel filter expect.
//!
//! ```rust,ignore
//! use lutprint_io::{read, write};
//!
//! let image = read("graded.png")?;
//! write("copy.png", &image)?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod png;

pub use error::{IoError, IoResult};
pub use lutprint_core::PixelBuffer;

use std::path::Path;

/// Reads a PNG file into an RGBA buffer.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<PixelBuffer> {
    png::read(path)
}

/// Writes a buffer as a PNG file.
pub fn write<P: AsRef<Path>>(path: P, image: &PixelBuffer) -> IoResult<()> {
    png::write(path, image)
}
