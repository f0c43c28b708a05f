//! Geometry detection from image dimensions.
//!
//! Only the pixel width and height of the transformed image are available, so
//! this solves `width = tiles_w * M`, `height = tiles_h * M` for `(N, M, layout)`.
//!
//! The `wide` hypothesis is tried first, then `tall`. Each hypothesis takes
//! `N` from the aspect ratio, derives `M`, and accepts only when the
//! dimensions are reconstructed exactly. For `N >= 2` a wide grid is always
//! wider than it is tall and a tall grid the opposite, so at most one
//! hypothesis can pass.
//!
//! Detection is best-effort: any resize, crop or padding by the external
//! process breaks the exact reconstruction and yields
//! [`Error::GeometryUndetectable`].

use crate::geometry::{Geometry, Layout, MAX_LATTICE_SIZE, MIN_LATTICE_SIZE};
use crate::{Error, Result};
use tracing::debug;

/// Recovers the `(N, M, layout)` that produced an image of `width x height`.
///
/// # Example
///
/// ```rust
/// use lutprint_core::{detect_geometry, Layout};
///
/// let g = detect_geometry(32, 8).unwrap();
/// assert_eq!((g.lattice_size, g.tile_size, g.layout), (4, 2, Layout::Wide));
/// ```
pub fn detect_geometry(width: u32, height: u32) -> Result<Geometry> {
    if let Some(g) = try_layout(width, height, Layout::Wide) {
        debug!(width, height, %g, "detected wide geometry");
        return Ok(g);
    }
    if let Some(g) = try_layout(width, height, Layout::Tall) {
        debug!(width, height, %g, "detected tall geometry");
        return Ok(g);
    }
    debug!(width, height, "no geometry reconstructs dimensions");
    Err(Error::GeometryUndetectable { width, height })
}

/// Tests a single layout hypothesis.
///
/// `long` is the side holding `N²` tiles, `short` the side holding `N`.
fn try_layout(width: u32, height: u32, layout: Layout) -> Option<Geometry> {
    let (long, short) = match layout {
        Layout::Wide => (width as u64, height as u64),
        Layout::Tall => (height as u64, width as u64),
    };
    if short == 0 || long % short != 0 {
        return None;
    }
    let n = long / short;
    if n < MIN_LATTICE_SIZE as u64 || n > MAX_LATTICE_SIZE as u64 {
        return None;
    }
    if short % n != 0 {
        return None;
    }
    let m = short / n;
    if m < 1 {
        return None;
    }
    // Divisibility alone can coincide; require the exact reconstruction.
    if n * n * m != long || n * m != short {
        return None;
    }
    Geometry::new(n as u32, m as u32, layout).ok()
}
