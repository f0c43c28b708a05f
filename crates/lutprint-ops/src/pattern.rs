//! Identity pattern generator.
//!
//! Rasterizes every lattice cell as a solid `M x M` block of its own
//! quantized color. Tiles are written in increasing index order with no
//! blending at the borders, so every pixel of a tile carries exactly the
//! cell's color.
//!
//! ```text
//! wide, N = 3:   b=0                       b=1 ...
//!                +--+--+--+--+--+--+--+--+--+
//!  row b         |r0|r1|r2|r0|r1|r2|r0|r1|r2|
//!                +--+--+--+--+--+--+--+--+--+
//!                 g=0      g=1      g=2
//! ```

use crate::OpsResult;
use lutprint_core::{
    compute_dims, tile_index_to_rgb, Dims, Error, Geometry, Layout, PixelBuffer, TaskContext,
    MAX_LATTICE_SIZE, MIN_LATTICE_SIZE, RECOMMENDED_MAX_LATTICE_SIZE, TILE_YIELD_INTERVAL,
};
use tracing::{debug, info, warn};

/// Default largest image edge, used when the host reports no limit.
pub const DEFAULT_MAX_DIMENSION: u32 = 16_384;

/// Fails with [`Error::DimensionLimitExceeded`] if `geometry` does not fit
/// in `max_dimension` pixels per side.
pub fn check_dimension_limit(geometry: &Geometry, max_dimension: u32) -> OpsResult<()> {
    check_dims(geometry.lattice_size, geometry.dims(), max_dimension)
}

/// Validates a requested pattern against the host limit, then builds its
/// [`Geometry`].
///
/// The limit is checked on the 64-bit pixel size before the geometry is
/// constructed, so requests too large for any image still report
/// [`Error::DimensionLimitExceeded`] with a suggested tile size.
pub fn pattern_geometry(
    lattice_size: u32,
    tile_size: u32,
    layout: Layout,
    max_dimension: u32,
) -> OpsResult<Geometry> {
    if (MIN_LATTICE_SIZE..=MAX_LATTICE_SIZE).contains(&lattice_size) && tile_size > 0 {
        let dims = compute_dims(lattice_size, tile_size, layout);
        check_dims(lattice_size, dims, max_dimension)?;
    }
    Ok(Geometry::new(lattice_size, tile_size, layout)?)
}

fn check_dims(n: u32, dims: Dims, max_dimension: u32) -> OpsResult<()> {
    let limit = max_dimension as u64;
    if dims.width > limit || dims.height > limit {
        return Err(Error::DimensionLimitExceeded {
            width: dims.width,
            height: dims.height,
            max_dimension,
            suggested_tile_size: max_dimension / (n * n),
        }
        .into());
    }
    Ok(())
}

/// Rasterizes the identity pattern as an RGBA buffer with opaque alpha.
///
/// Cancellation is checked before every tile; progress is reported every
/// [`TILE_YIELD_INTERVAL`] tiles and once at the end.
pub fn generate_pattern(
    geometry: &Geometry,
    max_dimension: u32,
    ctx: &TaskContext,
) -> OpsResult<PixelBuffer> {
    check_dimension_limit(geometry, max_dimension)?;
    let n = geometry.lattice_size;
    let m = geometry.tile_size;
    if n > RECOMMENDED_MAX_LATTICE_SIZE {
        warn!(
            lattice_size = n,
            recommended = RECOMMENDED_MAX_LATTICE_SIZE,
            "lattice size above the recommended maximum"
        );
    }

    let (width, height) = geometry.image_size();
    let mut image = PixelBuffer::new(width, height, 4);
    let total = geometry.tile_count();

    for t in 0..total {
        ctx.check_cancelled()?;
        let color = tile_index_to_rgb(t, n).color(n);
        let (x0, y0) = geometry.tile_origin(t);
        image.fill_rect(x0, y0, m, m, color)?;

        let done = t as u64 + 1;
        if done % TILE_YIELD_INTERVAL == 0 {
            ctx.checkpoint(done, total as u64);
        }
    }
    ctx.checkpoint(total as u64, total as u64);

    debug!(%geometry, width, height, "rasterized pattern");
    Ok(image)
}

/// Generates the pattern and encodes it as a PNG.
pub fn render_pattern_png(
    geometry: &Geometry,
    max_dimension: u32,
    ctx: &TaskContext,
) -> OpsResult<Vec<u8>> {
    let image = generate_pattern(geometry, max_dimension, ctx)?;
    let png = lutprint_io::png::encode(&image)?;
    info!(%geometry, bytes = png.len(), "encoded pattern");
    Ok(png)
}

/// Conventional output name, e.g. `lut_pattern_N17_M8_wide.png`.
pub fn pattern_file_name(geometry: &Geometry) -> String {
    format!(
        "lut_pattern_N{}_M{}_{}.png",
        geometry.lattice_size, geometry.tile_size, geometry.layout
    )
}
