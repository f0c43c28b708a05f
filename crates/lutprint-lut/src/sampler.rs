//! Recovering a LUT from a transformed pattern image.
//!
//! Each lattice cell's tile is located with the same addressing the
//! generator used, then read back as the mean of a small grid of sample
//! points inset from the tile border. The inset keeps resize or compression
//! bleed from neighbouring tiles out of the average.
//!
//! ```text
//! +---------------- M ----------------+
//! |  margin                           |
//! |     +------ region ------+        |
//! |     |  .    .    .    .  |        |   s x s midpoints,
//! |     |  .    .    .    .  |        |   s = clamp(region, 1, 8)
//! |     +--------------------+        |
//! +-----------------------------------+
//! ```

use crate::{cube, Lut3D, LutError, LutResult};
use lutprint_core::{Geometry, LatticeCoord, PixelBuffer, TaskContext, TILE_YIELD_INTERVAL};
use tracing::{debug, info, warn};

/// Largest sample grid edge per tile.
pub const MAX_SAMPLES_PER_AXIS: u32 = 8;

/// Border inset for a tile of edge `m`.
///
/// `max(1, floor(m * 0.2))`, falling back to `floor(m / 4)` when that would
/// leave no interior.
pub fn inset_margin(m: u32) -> u32 {
    let margin = (m / 5).max(1);
    if m <= 2 * margin { m / 4 } else { margin }
}

/// Mean RGB of the tile whose top-left pixel is `(x0, y0)`.
///
/// Channels are averaged independently in floating point. Sample
/// coordinates are clamped to the image, so tiles hanging off the edge of
/// a cropped image still produce a value.
pub fn sample_tile_color(image: &PixelBuffer, x0: u32, y0: u32, tile_size: u32) -> [f64; 3] {
    if image.width() == 0 || image.height() == 0 {
        return [0.0; 3];
    }
    let margin = inset_margin(tile_size);
    let region = tile_size - 2 * margin;
    let s = region.clamp(1, MAX_SAMPLES_PER_AXIS);
    let step = region as f64 / s as f64;

    let max_x = image.width() as u64 - 1;
    let max_y = image.height() as u64 - 1;
    let base_x = x0 as u64 + margin as u64;
    let base_y = y0 as u64 + margin as u64;

    let mut sum = [0.0f64; 3];
    for sy in 0..s {
        let py = (base_y + ((sy as f64 + 0.5) * step) as u64).min(max_y) as u32;
        for sx in 0..s {
            let px = (base_x + ((sx as f64 + 0.5) * step) as u64).min(max_x) as u32;
            let rgb = image.rgb(px, py);
            for c in 0..3 {
                sum[c] += rgb[c] as f64;
            }
        }
    }
    let count = (s * s) as f64;
    sum.map(|v| v / count)
}

/// Samples every lattice cell of `image` and builds the recovered LUT.
///
/// Cells are visited in `.cube` order (B outermost, R innermost).
/// Cancellation is checked before every cell; progress is reported every
/// [`TILE_YIELD_INTERVAL`] cells.
pub fn sample_lut(image: &PixelBuffer, geometry: &Geometry, ctx: &TaskContext) -> LutResult<Lut3D> {
    if image.width() == 0 || image.height() == 0 {
        return Err(LutError::InvalidSize("image has no pixels".into()));
    }
    let (expected_w, expected_h) = geometry.image_size();
    if (image.width(), image.height()) != (expected_w, expected_h) {
        warn!(
            width = image.width(),
            height = image.height(),
            expected_w,
            expected_h,
            "image size differs from geometry; samples are clamped to the image"
        );
    }

    let n = geometry.lattice_size;
    let m = geometry.tile_size;
    let total = geometry.tile_count() as u64;
    let mut data = Vec::with_capacity(total as usize);
    let mut done: u64 = 0;

    for b in 0..n {
        for g in 0..n {
            for r in 0..n {
                ctx.check_cancelled()?;
                let (x0, y0) = geometry.cell_origin(LatticeCoord::new(r, g, b));
                let avg = sample_tile_color(image, x0, y0, m);
                data.push(avg.map(|v| v / 255.0));

                done += 1;
                if done % TILE_YIELD_INTERVAL == 0 {
                    ctx.checkpoint(done, total);
                }
            }
        }
    }
    ctx.checkpoint(total, total);

    debug!(%geometry, cells = total, "sampled lattice");
    let lut = Lut3D::from_data(data, n as usize)?.with_title(cube_title(geometry));
    Ok(lut)
}

/// Samples `image` and renders the result as `.cube` text.
pub fn extract_cube(image: &PixelBuffer, geometry: &Geometry, ctx: &TaskContext) -> LutResult<String> {
    let lut = sample_lut(image, geometry, ctx)?;
    let text = cube::to_string(&lut);
    info!(%geometry, bytes = text.len(), "extracted .cube");
    Ok(text)
}

/// `TITLE` value embedding the geometry.
pub fn cube_title(geometry: &Geometry) -> String {
    format!("lutprint {geometry}")
}
